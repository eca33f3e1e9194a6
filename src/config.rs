use std::env;
use std::str::FromStr;
use anyhow::{bail, Context, Result};

/// Which store backs the item repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Spanner,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spanner" => Ok(StoreBackend::Spanner),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("ITEM_STORE must be one of: spanner, memory, got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub spanner_emulator_host: Option<String>,
    pub spanner_project: String,
    pub spanner_instance: String,
    pub spanner_database: String,
    pub spanner_instance_config: String,
    pub items_table: String,
    pub service_port: u16,
    pub service_host: String,
    pub api_base_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = env::var("ITEM_STORE")
            .unwrap_or_else(|_| "spanner".to_string())
            .parse::<StoreBackend>()?;

        let spanner_emulator_host = env::var("SPANNER_EMULATOR_HOST").ok();

        let spanner_project = env::var("SPANNER_PROJECT")
            .unwrap_or_else(|_| "local-project".to_string());

        let spanner_instance = env::var("SPANNER_INSTANCE")
            .unwrap_or_else(|_| "items-instance".to_string());

        let spanner_database = env::var("SPANNER_DATABASE")
            .unwrap_or_else(|_| "items-db".to_string());

        let spanner_instance_config = env::var("SPANNER_INSTANCE_CONFIG")
            .unwrap_or_else(|_| "regional-us-central1".to_string());

        let items_table = env::var("ITEMS_TABLE")
            .unwrap_or_else(|_| "items".to_string());
        if !is_plain_identifier(&items_table) {
            bail!(
                "ITEMS_TABLE must be a plain SQL identifier (letters, digits, underscores), got '{}'",
                items_table
            );
        }

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let api_base_path = match env::var("API_BASE_PATH") {
            Ok(path) => parse_base_path(&path)?,
            Err(_) => None,
        };

        Ok(Config {
            store_backend,
            spanner_emulator_host,
            spanner_project,
            spanner_instance,
            spanner_database,
            spanner_instance_config,
            items_table,
            service_port,
            service_host,
            api_base_path,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Item store: {:?}", self.store_backend);
        if self.store_backend == StoreBackend::Spanner {
            tracing::info!("  Spanner emulator: {}",
                self.spanner_emulator_host.as_deref().unwrap_or("disabled (using production)"));
            tracing::info!("  Spanner project: {}", self.spanner_project);
            tracing::info!("  Spanner instance: {} ({})", self.spanner_instance, self.spanner_instance_config);
            tracing::info!("  Spanner database: {}", self.spanner_database);
            tracing::info!("  Items table: {}", self.items_table);
        }
        tracing::info!("  Service listening on: {}:{}{}",
            self.service_host,
            self.service_port,
            self.api_base_path.as_deref().unwrap_or(""));
    }
}

/// Normalize a route prefix: trailing slashes go, and a prefix that is
/// nothing but slashes means "no prefix" (axum cannot nest at the root).
fn parse_base_path(path: &str) -> Result<Option<String>> {
    if path.is_empty() {
        return Ok(None);
    }
    if !path.starts_with('/') {
        bail!("API_BASE_PATH must start with '/', got '{}'", path);
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

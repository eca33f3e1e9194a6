use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert, update};
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::Statement;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{format_timestamp, Item, ItemFields};
use crate::repository::{ItemRepository, RepositoryError, RepositoryResult};

const COLUMNS: [&str; 4] = ["id", "name", "description", "created_at"];

/// Item repository backed by a Spanner table
#[derive(Clone)]
pub struct SpannerItemRepository {
    inner: Arc<Client>,
    table: String,
}

impl SpannerItemRepository {
    /// Create a new Spanner-backed repository from configuration
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    ///
    /// The instance, database, and items table are created first if
    /// they don't exist.
    pub async fn from_config(config: &Config) -> Result<Self> {
        ItemStoreProvisioner::connect(config).await?.run().await?;

        let database_path = ResourcePaths::from_config(config).database;

        match &config.spanner_emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
            table: config.items_table.clone(),
        })
    }

    async fn read_item(&self, id: &str) -> Result<Option<Item>> {
        let sql = format!(
            "SELECT id, name, description, created_at FROM {} WHERE id = @id",
            self.table
        );
        let id = id.to_string();
        let mut statement = Statement::new(&sql);
        statement.add_param("id", &id);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query item from Spanner")?;

        match result_set.next().await? {
            Some(row) => Ok(Some(item_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

/// Decode one `items` row
fn item_from_row(row: &Row) -> Result<Item> {
    let id: String = row.column_by_name("id")?;
    let name: String = row.column_by_name("name")?;
    let description: String = row.column_by_name("description")?;
    let created_at_str: String = row.column_by_name("created_at")?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .context("Failed to parse created_at timestamp")?
        .with_timezone(&Utc);

    Ok(Item {
        id,
        name,
        description,
        created_at,
    })
}

#[async_trait]
impl ItemRepository for SpannerItemRepository {
    async fn create(&self, fields: ItemFields) -> RepositoryResult<Item> {
        let item = Item::new(fields);
        let created_at = format_timestamp(&item.created_at);

        let mutation = insert(
            &self.table,
            &COLUMNS,
            &[&item.id, &item.name, &item.description, &created_at],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to insert item into Spanner")?;

        tracing::debug!("Inserted item with id: {}", item.id);
        Ok(item)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Item> {
        match self.read_item(id).await? {
            Some(item) => {
                tracing::debug!("Read item with id: {}", id);
                Ok(item)
            }
            None => {
                tracing::debug!("Item not found with id: {}", id);
                Err(RepositoryError::NotFound(id.to_string()))
            }
        }
    }

    async fn list(&self) -> RepositoryResult<Vec<Item>> {
        // created_at is a fixed-width RFC 3339 string, so string order is time order
        let sql = format!(
            "SELECT id, name, description, created_at FROM {} ORDER BY created_at DESC",
            self.table
        );
        let statement = Statement::new(&sql);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for list")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute list query")?;

        let mut items = Vec::new();
        while let Some(row) = result_set.next().await.context("Failed to read list row")? {
            items.push(item_from_row(&row)?);
        }

        tracing::debug!("Listed {} items", items.len());
        Ok(items)
    }

    async fn update(&self, id: &str, fields: ItemFields) -> RepositoryResult<Item> {
        // Read first so an absent id yields NotFound instead of a mutation error.
        // A row deleted after the read surfaces as StoreFailure (500); accepted under last-write-wins.
        let mut item = self.get(id).await?;
        item.apply(fields);

        let mutation = update(
            &self.table,
            &["id", "name", "description"],
            &[&item.id, &item.name, &item.description],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to update item in Spanner")?;

        tracing::debug!("Updated item with id: {}", id);
        Ok(item)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        // Same read-then-mutate window as update; a concurrent delete after the read is a 500
        self.get(id).await?;

        self.inner
            .apply(vec![delete(&self.table, Key::new(&id.to_string()))])
            .await
            .context("Failed to delete item from Spanner")?;

        tracing::debug!("Deleted item with id: {}", id);
        Ok(())
    }

    /// Executes `SELECT 1` to verify the connection is alive
    async fn health_check(&self) -> RepositoryResult<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await.context("Failed to read health check row")?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results").into())
        }
    }
}

/// Fully qualified Spanner resource names derived from `Config`
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourcePaths {
    project: String,
    instance: String,
    database: String,
}

impl ResourcePaths {
    fn from_config(config: &Config) -> Self {
        let project = format!("projects/{}", config.spanner_project);
        let instance = format!("{}/instances/{}", project, config.spanner_instance);
        let database = format!("{}/databases/{}", instance, config.spanner_database);
        Self {
            project,
            instance,
            database,
        }
    }

    /// The emulator only knows `emulator-config`
    fn instance_config(&self, config: &Config) -> String {
        let name = match config.spanner_emulator_host {
            Some(_) => "emulator-config",
            None => config.spanner_instance_config.as_str(),
        };
        format!("{}/instanceConfigs/{}", self.project, name)
    }
}

/// Creates whichever of instance, database and items table is missing
///
/// Each step is a lookup followed by a create on `NotFound`, so running it
/// against an already provisioned store is a no-op.
struct ItemStoreProvisioner<'a> {
    admin: AdminClient,
    config: &'a Config,
    paths: ResourcePaths,
}

impl<'a> ItemStoreProvisioner<'a> {
    async fn connect(config: &'a Config) -> Result<Self> {
        let admin = AdminClient::new(AdminClientConfig::default())
            .await
            .context("Failed to create Spanner admin client")?;

        Ok(Self {
            admin,
            config,
            paths: ResourcePaths::from_config(config),
        })
    }

    async fn run(&self) -> Result<()> {
        tracing::info!("Checking Spanner resources for the item store");
        self.provision_instance().await?;
        self.provision_database().await?;
        self.provision_items_table().await?;
        tracing::info!("Item store resources ready");
        Ok(())
    }

    async fn provision_instance(&self) -> Result<()> {
        let path = &self.paths.instance;
        let lookup = GetInstanceRequest {
            name: path.clone(),
            field_mask: None,
        };

        match self.admin.instance().get_instance(lookup, None).await {
            Ok(_) => {
                tracing::info!("Instance already exists: {}", path);
                return Ok(());
            }
            Err(status) if status.code() == Code::NotFound => {}
            Err(status) => bail!("Failed to look up instance {}: {}", path, status.message()),
        }

        tracing::info!("Creating instance: {}", path);
        let request = CreateInstanceRequest {
            parent: self.paths.project.clone(),
            instance_id: self.config.spanner_instance.clone(),
            instance: Some(Instance {
                name: path.clone(),
                config: self.paths.instance_config(self.config),
                display_name: format!("{} items", self.config.spanner_instance),
                node_count: 1,
                ..Default::default()
            }),
        };

        self.admin
            .instance()
            .create_instance(request, None)
            .await
            .context("Failed to start instance creation")?
            .wait(None)
            .await
            .context("Failed to create instance")?;

        tracing::info!("Instance created: {}", path);
        Ok(())
    }

    async fn provision_database(&self) -> Result<()> {
        let path = &self.paths.database;
        let lookup = GetDatabaseRequest { name: path.clone() };

        match self.admin.database().get_database(lookup, None).await {
            Ok(_) => {
                tracing::info!("Database already exists: {}", path);
                return Ok(());
            }
            Err(status) if status.code() == Code::NotFound => {}
            Err(status) => bail!("Failed to look up database {}: {}", path, status.message()),
        }

        tracing::info!("Creating database: {}", path);
        let request = CreateDatabaseRequest {
            parent: self.paths.instance.clone(),
            create_statement: format!("CREATE DATABASE `{}`", self.config.spanner_database),
            extra_statements: vec![],
            encryption_config: None,
            database_dialect: 1, // Google Standard SQL
            proto_descriptors: vec![],
        };

        self.admin
            .database()
            .create_database(request, None)
            .await
            .context("Failed to start database creation")?
            .wait(None)
            .await
            .context("Failed to create database")?;

        tracing::info!("Database created: {}", path);
        Ok(())
    }

    async fn provision_items_table(&self) -> Result<()> {
        let table = &self.config.items_table;
        let lookup = GetDatabaseDdlRequest {
            database: self.paths.database.clone(),
        };

        let statements = self
            .admin
            .database()
            .get_database_ddl(lookup, None)
            .await
            .context("Failed to get database DDL")?
            .into_inner()
            .statements;

        if ddl_defines_table(&statements, table) {
            tracing::info!("Table '{}' already exists", table);
            return Ok(());
        }

        tracing::info!("Creating table '{}'", table);
        let request = UpdateDatabaseDdlRequest {
            database: self.paths.database.clone(),
            statements: vec![create_table_ddl(table)],
            operation_id: String::new(),
            proto_descriptors: vec![],
            throughput_mode: false,
        };

        self.admin
            .database()
            .update_database_ddl(request, None)
            .await
            .context("Failed to start table creation")?
            .wait(None)
            .await
            .context("Failed to create table")?;

        tracing::info!("Table '{}' created", table);
        Ok(())
    }
}

/// DDL for the items table
fn create_table_ddl(table: &str) -> String {
    format!(
        r#"
CREATE TABLE {table} (
    id STRING(36) NOT NULL,
    name STRING(100) NOT NULL,
    description STRING(500) NOT NULL,
    created_at STRING(32) NOT NULL,
) PRIMARY KEY (id)
"#
    )
    .trim()
    .to_string()
}

/// Whether any DDL statement creates `table`
fn ddl_defines_table(statements: &[String], table: &str) -> bool {
    let plain = format!("CREATE TABLE {} ", table);
    let plain_paren = format!("CREATE TABLE {}(", table);
    let quoted = format!("CREATE TABLE `{}`", table);
    statements
        .iter()
        .any(|stmt| stmt.starts_with(&plain) || stmt.starts_with(&plain_paren) || stmt.starts_with(&quoted))
}

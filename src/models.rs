use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// A stored item
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Build a new item with a fresh UUID v4 id and the current time
    pub fn new(fields: ItemFields) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            created_at: now(),
        }
    }

    /// Overwrite the mutable fields; id and creation time are kept
    pub fn apply(&mut self, fields: ItemFields) {
        self.name = fields.name;
        self.description = fields.description;
    }
}

/// Current UTC time truncated to the precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 rendering, so string order matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Validated name and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    name: String,
    description: String,
}

/// Rejected request body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters, got {actual}")]
    NameTooLong { max: usize, actual: usize },
    #[error("description must be at most {max} characters, got {actual}")]
    DescriptionTooLong { max: usize, actual: usize },
}

/// Request body for POST /items and PUT /items/{id}
///
/// Unknown fields (such as a client-supplied `id`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemPayload {
    /// 1 to 100 characters
    pub name: String,
    /// Up to 500 characters
    pub description: String,
}

impl TryFrom<ItemPayload> for ItemFields {
    type Error = ValidationError;

    fn try_from(payload: ItemPayload) -> Result<Self, Self::Error> {
        let name_len = payload.name.chars().count();
        if name_len == 0 {
            return Err(ValidationError::EmptyName);
        }
        if name_len > NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong {
                max: NAME_MAX_CHARS,
                actual: name_len,
            });
        }

        let description_len = payload.description.chars().count();
        if description_len > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX_CHARS,
                actual: description_len,
            });
        }

        Ok(ItemFields {
            name: payload.name,
            description: payload.description,
        })
    }
}

/// Item as returned by the API
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    /// ISO 8601 creation timestamp
    pub created_at: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            created_at: format_timestamp(&item.created_at),
            id: item.id,
            name: item.name,
            description: item.description,
        }
    }
}

/// Response type for successful DELETE operations
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Response type for the service banner
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
}

#[cfg(test)]
pub(crate) fn fields(name: &str, description: &str) -> ItemFields {
    ItemPayload {
        name: name.to_string(),
        description: description.to_string(),
    }
    .try_into()
    .expect("test fields should be valid")
}

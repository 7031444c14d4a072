use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Violations;

pub const NAME_MIN_CHARS: usize = 5;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Product as handed to callers; a NULL description reads as `""`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub stock: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description.unwrap_or_default(),
            stock: m.stock,
            price: m.price,
            created_at: m.created_at,
            modified_at: m.modified_at,
        }
    }
}

/// Client-supplied product fields. The service fills in `id`, `created_at`
/// and `modified_at` before anything is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stock: i64,
    pub price: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ProductRequest {
    pub fn new(name: &str, description: &str, stock: i64, price: i64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            stock,
            price,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Violations {
        let mut v = Violations::default();

        let name = self.name.trim();
        let len = name.chars().count();
        if name.is_empty() {
            v.push("name", "is required");
        } else if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
            v.push("name", format!("must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"));
        } else if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
            v.push("name", "may only contain letters and spaces");
        }

        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            v.push("description", format!("must be at most {DESCRIPTION_MAX_CHARS} characters"));
        } else if !self.description.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) {
            v.push("description", "may only contain letters, digits and spaces");
        }

        if self.stock < 0 {
            v.push("stock", "must not be negative");
        } else if i32::try_from(self.stock).is_err() {
            v.push("stock", "is out of range");
        }

        if self.price < 0 {
            v.push("price", "must not be negative");
        }

        v
    }

    /// Description as stored: empty means NULL.
    pub fn stored_description(&self) -> Option<String> {
        let d = self.description.trim();
        if d.is_empty() { None } else { Some(d.to_string()) }
    }
}

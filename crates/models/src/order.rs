use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Violations;

pub const STATUS_MAX_CHARS: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub username: String,
    pub quantity: i32,
    pub total: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub modified_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub username: String,
    pub quantity: i32,
    pub total: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<Model> for Order {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            product_name: m.product_name,
            username: m.username,
            quantity: m.quantity,
            total: m.total,
            status: m.status,
            created_at: m.created_at,
            modified_at: m.modified_at,
        }
    }
}

/// Order update payload. Clients may send a whole order back; only the
/// lifecycle status is ever written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl OrderRequest {
    pub fn with_status(status: &str) -> Self {
        Self { status: status.to_string(), modified_at: None }
    }

    pub fn validate(&self) -> Violations {
        let mut v = Violations::default();
        let status = self.status.trim();
        if status.is_empty() {
            v.push("status", "is required");
        } else if status.chars().count() > STATUS_MAX_CHARS {
            v.push("status", format!("must be at most {STATUS_MAX_CHARS} characters"));
        }
        v
    }
}

pub mod login;
pub mod orders;
pub mod products;

use axum::Json;
use common::types::Health;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

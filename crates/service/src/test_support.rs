#![cfg(test)]
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use migration::MigratorTrait;
use models::admin::{self, Admin};
use models::order::{self, Order, OrderRequest};
use models::product::{Product, ProductRequest};
use common::oplog::RecordingLog;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::catalog::ProductRepository;
use crate::errors::ServiceError;
use crate::orders::OrderRepository;

/// Fresh in-memory database with the schema applied.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = models::db::connect_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn recording_log() -> Arc<RecordingLog> {
    Arc::new(RecordingLog::default())
}

pub async fn seed_order(db: &DatabaseConnection, status: &str) -> anyhow::Result<Order> {
    let row = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(Uuid::new_v4()),
        product_name: Set("Fried Rice".into()),
        username: Set("customer".into()),
        quantity: Set(2),
        total: Set(30000),
        status: Set(status.into()),
        created_at: Set(Utc::now()),
        modified_at: Set(None),
    }
    .insert(db)
    .await?;
    Ok(row.into())
}

pub async fn seed_admin(db: &DatabaseConnection, username: &str, password: &str) -> anyhow::Result<Admin> {
    let row = admin::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.into()),
        password: Set(password.into()),
    }
    .insert(db)
    .await?;
    Ok(row)
}

/// Runs the wrapped write, then fails, so the surrounding transaction has
/// real changes to roll back.
pub struct FailAfter<R> {
    inner: R,
}

impl<R> FailAfter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

fn forced() -> ServiceError {
    ServiceError::Persistence("forced failure after write".into())
}

#[async_trait]
impl<R: ProductRepository> ProductRepository for FailAfter<R> {
    async fn add_product<C: ConnectionTrait>(&self, conn: &C, product: &Product) -> Result<Product, ServiceError> {
        self.inner.add_product(conn, product).await?;
        Err(forced())
    }

    async fn get_products<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Product>, ServiceError> {
        self.inner.get_products(conn).await
    }

    async fn delete_product<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError> {
        self.inner.delete_product(conn, id).await?;
        Err(forced())
    }

    async fn update_product<C: ConnectionTrait>(&self, conn: &C, product: &ProductRequest, id: Uuid) -> Result<Product, ServiceError> {
        self.inner.update_product(conn, product, id).await?;
        Err(forced())
    }
}

#[async_trait]
impl<R: OrderRepository> OrderRepository for FailAfter<R> {
    async fn get_orders<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Order>, ServiceError> {
        self.inner.get_orders(conn).await
    }

    async fn update_order<C: ConnectionTrait>(&self, conn: &C, order: &OrderRequest, id: Uuid) -> Result<Order, ServiceError> {
        self.inner.update_order(conn, order, id).await?;
        Err(forced())
    }

    async fn delete_order<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError> {
        self.inner.delete_order(conn, id).await?;
        Err(forced())
    }
}

use std::sync::Arc;

use chrono::Utc;
use models::order::{Order, OrderRequest};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::repository::OrderRepository;
use crate::errors::ServiceError;

pub struct OrderService<R: OrderRepository> {
    db: DatabaseConnection,
    repo: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(db: DatabaseConnection, repo: Arc<R>) -> Self {
        Self { db, repo }
    }

    /// Plain read on the pool; no transaction is opened.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<Order>, ServiceError> {
        let orders = self.repo.get_orders(&self.db).await?;
        debug!(count = orders.len(), "orders_listed");
        Ok(orders)
    }

    /// Only the status moves; the rest of the order is immutable here.
    #[instrument(skip(self, req), fields(status = %req.status))]
    pub async fn update_order(&self, mut req: OrderRequest, id: Uuid) -> Result<Order, ServiceError> {
        req.validate().into_result()?;
        req.modified_at = Some(Utc::now());

        let repo = self.repo.clone();
        let updated = self
            .db
            .transaction::<_, Order, ServiceError>(move |txn| {
                Box::pin(async move { repo.update_order(txn, &req, id).await })
            })
            .await?;
        info!(order_id = %id, status = %updated.status, "order_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let repo = self.repo.clone();
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move { repo.delete_order(txn, id).await })
            })
            .await?;
        info!(order_id = %id, "order_deleted");
        Ok(())
    }
}

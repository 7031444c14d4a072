use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{LogLevel, OperationLog};
use models::order::{self, Order, OrderRequest};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Order persistence. Orders are created elsewhere; here they are listed,
/// moved between statuses and removed.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn get_orders<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Order>, ServiceError>;
    async fn update_order<C: ConnectionTrait>(&self, conn: &C, order: &OrderRequest, id: Uuid) -> Result<Order, ServiceError>;
    async fn delete_order<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError>;
}

pub struct SeaOrmOrderRepository {
    log: Arc<dyn OperationLog>,
}

impl SeaOrmOrderRepository {
    pub fn new(log: Arc<dyn OperationLog>) -> Self {
        Self { log }
    }

    fn fail(&self, op: &str, err: ServiceError) -> ServiceError {
        let level = if matches!(err, ServiceError::NotFound(_)) { LogLevel::Warn } else { LogLevel::Error };
        self.log.log("repository", level, &format!("{op}: {err}"));
        err
    }

    fn db_fail(&self, op: &str, err: DbErr) -> ServiceError {
        self.fail(op, err.into())
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn get_orders<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Order>, ServiceError> {
        let rows = order::Entity::find()
            .order_by_asc(order::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| self.db_fail("get orders", e))?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn update_order<C: ConnectionTrait>(&self, conn: &C, req: &OrderRequest, id: Uuid) -> Result<Order, ServiceError> {
        let modified_at = req.modified_at.unwrap_or_else(Utc::now);
        let res = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(req.status.trim().to_string()))
            .col_expr(order::Column::ModifiedAt, Expr::value(Some(modified_at)))
            .filter(order::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| self.db_fail("update order", e))?;
        if res.rows_affected == 0 {
            return Err(self.fail("update order", ServiceError::not_found("order", id)));
        }

        let row = order::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| self.db_fail("update order", e))?
            .ok_or_else(|| self.fail("update order", ServiceError::not_found("order", id)))?;
        Ok(row.into())
    }

    async fn delete_order<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError> {
        let res = order::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| self.db_fail("delete order", e))?;
        if res.rows_affected == 0 {
            return Err(self.fail("delete order", ServiceError::not_found("order", id)));
        }
        Ok(())
    }
}

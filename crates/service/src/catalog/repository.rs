use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{LogLevel, OperationLog};
use models::product::{self, Product, ProductRequest};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Product persistence. Every call runs on the connection it is handed,
/// which is a transaction whenever the caller is a service.
#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    async fn add_product<C: ConnectionTrait>(&self, conn: &C, product: &Product) -> Result<Product, ServiceError>;
    async fn get_products<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Product>, ServiceError>;
    async fn delete_product<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError>;
    async fn update_product<C: ConnectionTrait>(&self, conn: &C, product: &ProductRequest, id: Uuid) -> Result<Product, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmProductRepository {
    log: Arc<dyn OperationLog>,
}

impl SeaOrmProductRepository {
    pub fn new(log: Arc<dyn OperationLog>) -> Self {
        Self { log }
    }

    fn db_failure(&self, op: &str, err: DbErr) -> ServiceError {
        self.report(op, err.into())
    }

    fn report(&self, op: &str, err: ServiceError) -> ServiceError {
        let level = match err {
            ServiceError::NotFound(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        };
        self.log.log("repository", level, &format!("{op}: {err}"));
        err
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn add_product<C: ConnectionTrait>(&self, conn: &C, p: &Product) -> Result<Product, ServiceError> {
        let description = if p.description.is_empty() { None } else { Some(p.description.clone()) };
        let am = product::ActiveModel {
            id: Set(p.id),
            name: Set(p.name.clone()),
            description: Set(description),
            stock: Set(p.stock),
            price: Set(p.price),
            created_at: Set(p.created_at),
            modified_at: Set(None),
        };
        let rows = product::Entity::insert(am)
            .exec_without_returning(conn)
            .await
            .map_err(|e| self.db_failure("add product", e))?;
        if rows == 0 {
            return Err(self.report("add product", ServiceError::Persistence("insert affected no rows".into())));
        }
        Ok(Product { modified_at: None, ..p.clone() })
    }

    async fn get_products<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Product>, ServiceError> {
        let rows = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| self.db_failure("get products", e))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete_product<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> Result<(), ServiceError> {
        let res = product::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| self.db_failure("delete product", e))?;
        if res.rows_affected == 0 {
            return Err(self.report("delete product", ServiceError::not_found("product", id)));
        }
        Ok(())
    }

    async fn update_product<C: ConnectionTrait>(&self, conn: &C, req: &ProductRequest, id: Uuid) -> Result<Product, ServiceError> {
        let stock = i32::try_from(req.stock)
            .map_err(|_| ServiceError::Validation(models::Violations::single("stock", "is out of range")))?;
        let modified_at = req.modified_at.unwrap_or_else(Utc::now);
        let res = product::Entity::update_many()
            .col_expr(product::Column::Name, Expr::value(req.name.trim().to_string()))
            .col_expr(product::Column::Description, Expr::value(req.stored_description()))
            .col_expr(product::Column::Stock, Expr::value(stock))
            .col_expr(product::Column::Price, Expr::value(req.price))
            .col_expr(product::Column::ModifiedAt, Expr::value(Some(modified_at)))
            .filter(product::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| self.db_failure("update product", e))?;
        if res.rows_affected == 0 {
            return Err(self.report("update product", ServiceError::not_found("product", id)));
        }

        // canonical post-update state
        let row = product::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| self.db_failure("update product", e))?
            .ok_or_else(|| self.report("update product", ServiceError::not_found("product", id)))?;
        Ok(row.into())
    }
}

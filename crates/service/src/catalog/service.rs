use std::sync::Arc;

use chrono::Utc;
use models::product::{Product, ProductRequest};
use models::Violations;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::repository::ProductRepository;
use crate::errors::ServiceError;

/// Product use cases. Every call is one unit of work: the transaction is
/// committed when the repository succeeds and rolled back otherwise.
pub struct ProductService<R: ProductRepository> {
    db: DatabaseConnection,
    repo: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(db: DatabaseConnection, repo: Arc<R>) -> Self {
        Self { db, repo }
    }

    /// Assign a fresh id and creation time, then persist.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::oplog::TracingLog;
    /// use migration::MigratorTrait;
    /// use models::product::ProductRequest;
    /// use service::catalog::{ProductService, SeaOrmProductRepository};
    ///
    /// tokio_test::block_on(async {
    ///     let db = models::db::connect_memory().await.unwrap();
    ///     migration::Migrator::up(&db, None).await.unwrap();
    ///     let repo = Arc::new(SeaOrmProductRepository::new(Arc::new(TracingLog)));
    ///     let svc = ProductService::new(db, repo);
    ///     let p = svc.add_product(ProductRequest::new("Fried Rice", "spicy", 50, 15000)).await.unwrap();
    ///     assert_eq!(p.stock, 50);
    ///     assert!(p.modified_at.is_none());
    /// });
    /// ```
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn add_product(&self, req: ProductRequest) -> Result<Product, ServiceError> {
        req.validate().into_result()?;
        let product = Product {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            description: req.stored_description().unwrap_or_default(),
            stock: column_stock(req.stock)?,
            price: req.price,
            created_at: Utc::now(),
            modified_at: None,
        };

        let repo = self.repo.clone();
        let created = self
            .db
            .transaction::<_, Product, ServiceError>(move |txn| {
                Box::pin(async move { repo.add_product(txn, &product).await })
            })
            .await?;
        info!(product_id = %created.id, "product_added");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ServiceError> {
        let repo = self.repo.clone();
        let products = self
            .db
            .transaction::<_, Vec<Product>, ServiceError>(move |txn| {
                Box::pin(async move { repo.get_products(txn).await })
            })
            .await?;
        debug!(count = products.len(), "products_listed");
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let repo = self.repo.clone();
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move { repo.delete_product(txn, id).await })
            })
            .await?;
        info!(product_id = %id, "product_deleted");
        Ok(())
    }

    /// Stamps `modified_at` and returns the row as stored after the update.
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn update_product(&self, mut req: ProductRequest, id: Uuid) -> Result<Product, ServiceError> {
        req.validate().into_result()?;
        req.modified_at = Some(Utc::now());

        let repo = self.repo.clone();
        let updated = self
            .db
            .transaction::<_, Product, ServiceError>(move |txn| {
                Box::pin(async move { repo.update_product(txn, &req, id).await })
            })
            .await?;
        info!(product_id = %id, "product_updated");
        Ok(updated)
    }
}

fn column_stock(stock: i64) -> Result<i32, ServiceError> {
    i32::try_from(stock).map_err(|_| Violations::single("stock", "is out of range").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SeaOrmProductRepository;
    use crate::test_support::{get_db, recording_log, FailAfter};
    use common::LogLevel;

    async fn service() -> anyhow::Result<(ProductService<SeaOrmProductRepository>, DatabaseConnection)> {
        let db = get_db().await?;
        let repo = Arc::new(SeaOrmProductRepository::new(recording_log()));
        Ok((ProductService::new(db.clone(), repo), db))
    }

    #[tokio::test]
    async fn add_assigns_identity_and_keeps_numbers() -> anyhow::Result<()> {
        let (svc, _db) = service().await?;
        let mut req = ProductRequest::new("Fried Rice", "spicy", 50, 15000);
        let client_id = Uuid::new_v4();
        req.id = Some(client_id);

        let p = svc.add_product(req).await?;
        assert_ne!(p.id, client_id);
        assert!(p.modified_at.is_none());

        let all = svc.get_products().await?;
        let stored = all.iter().find(|x| x.id == p.id).expect("added product listed");
        assert_eq!(stored.stock, 50);
        assert_eq!(stored.price, 15000);
        assert_eq!(stored.description, "spicy");
        Ok(())
    }

    #[tokio::test]
    async fn update_stamps_modified_after_created() -> anyhow::Result<()> {
        let (svc, _db) = service().await?;
        let p = svc.add_product(ProductRequest::new("Fried Rice", "", 50, 15000)).await?;

        let updated = svc
            .update_product(ProductRequest::new("Fried Noodles", "less oil", 20, 17000), p.id)
            .await?;
        assert_eq!(updated.name, "Fried Noodles");
        assert_eq!(updated.description, "less oil");
        assert_eq!(updated.stock, 20);
        assert_eq!(updated.price, 17000);
        let modified = updated.modified_at.expect("modified_at set");
        assert!(modified > updated.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() -> anyhow::Result<()> {
        let (svc, _db) = service().await?;
        let p = svc.add_product(ProductRequest::new("Fried Rice", "", 1, 1)).await?;

        svc.delete_product(p.id).await?;
        assert!(svc.get_products().await?.iter().all(|x| x.id != p.id));
        let err = svc.delete_product(p.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_store() -> anyhow::Result<()> {
        let (svc, _db) = service().await?;
        let err = svc.add_product(ProductRequest::new("Rice", "", -1, 1)).await.unwrap_err();
        match err {
            ServiceError::Validation(v) => {
                assert!(v.contains_field("name"));
                assert!(v.contains_field("stock"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(svc.get_products().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failure_after_write_rolls_back() -> anyhow::Result<()> {
        let db = get_db().await?;
        let log = recording_log();
        let inner = SeaOrmProductRepository::new(log.clone());
        let svc = ProductService::new(db.clone(), Arc::new(FailAfter::new(inner)));

        let err = svc.add_product(ProductRequest::new("Fried Rice", "", 5, 100)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));

        let plain = ProductService::new(db, Arc::new(SeaOrmProductRepository::new(log.clone())));
        assert!(plain.get_products().await?.is_empty());
        assert!(log.entries().iter().all(|e| e.level != LogLevel::Info));
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_row_unchanged() -> anyhow::Result<()> {
        let (svc, db) = service().await?;
        let before = svc.add_product(ProductRequest::new("Fried Rice", "spicy", 50, 15000)).await?;
        let failing = ProductService::new(db, Arc::new(FailAfter::new(SeaOrmProductRepository::new(recording_log()))));

        let err = failing
            .update_product(ProductRequest::new("Fried Noodles", "mild", 1, 1), before.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)), "{err:?}");

        let after = svc.get_products().await?;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].name, "Fried Rice");
        assert_eq!(after[0].description, "spicy");
        assert_eq!(after[0].stock, 50);
        assert_eq!(after[0].price, 15000);
        assert!(after[0].modified_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_keeps_row() -> anyhow::Result<()> {
        let (svc, db) = service().await?;
        let p = svc.add_product(ProductRequest::new("Fried Rice", "", 5, 100)).await?;
        let failing = ProductService::new(db, Arc::new(FailAfter::new(SeaOrmProductRepository::new(recording_log()))));

        let err = failing.delete_product(p.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)), "{err:?}");

        let after = svc.get_products().await?;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, p.id);
        Ok(())
    }
}

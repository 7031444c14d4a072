//! Schema and transaction behaviour against in-memory SQLite.

use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use anyhow::Result;
use uuid::Uuid;

use crate::db::connect_memory;
use crate::{admin, product};

async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn product_am(name: &str, stock: i32) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        stock: Set(stock),
        price: Set(15000),
        created_at: Set(Utc::now()),
        modified_at: Set(None),
    }
}

#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    let db = setup_test_db().await?;

    let txn = db.begin().await?;
    let created = product_am("Fried Rice", 50).insert(&txn).await?;
    txn.commit().await?;

    let found = product::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.map(|p| p.name), Some("Fried Rice".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let db = setup_test_db().await?;

    let txn = db.begin().await?;
    let created = product_am("Fried Rice", 50).insert(&txn).await?;
    txn.rollback().await?;

    assert!(product::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() -> Result<()> {
    let db = setup_test_db().await?;

    let id = {
        let txn = db.begin().await?;
        let created = product_am("Fried Rice", 50).insert(&txn).await?;
        created.id
        // txn dropped without commit
    };

    assert!(product::Entity::find_by_id(id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_negative_stock_rejected_by_schema() -> Result<()> {
    let db = setup_test_db().await?;
    assert!(product_am("Fried Rice", -1).insert(&db).await.is_err());
    assert!(product::Entity::find().all(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_username_unique() -> Result<()> {
    let db = setup_test_db().await?;
    let am = |name: &str| admin::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(name.to_string()),
        password: Set("stored-credential".to_string()),
    };
    am("chef").insert(&db).await?;
    assert!(am("chef").insert(&db).await.is_err());
    Ok(())
}

//! Migrator registering the catering schema in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_products;
mod m20240301_000002_create_orders;
mod m20240301_000003_create_admin;
mod m20240301_000004_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_products::Migration),
            Box::new(m20240301_000002_create_orders::Migration),
            Box::new(m20240301_000003_create_admin::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000004_add_indexes::Migration),
        ]
    }
}

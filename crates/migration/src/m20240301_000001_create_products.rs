//! Create `products` table.
//!
//! `description` and `modified_at` are nullable; stock and price are guarded
//! against negative values at the schema level too.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(uuid(Products::Id).primary_key())
                    .col(string_len(Products::Name, 50).not_null())
                    .col(ColumnDef::new(Products::Description).string_len(255).null())
                    .col(
                        integer(Products::Stock)
                            .not_null()
                            .check(Expr::col(Products::Stock).gte(0)),
                    )
                    .col(
                        big_integer(Products::Price)
                            .not_null()
                            .check(Expr::col(Products::Price).gte(0)),
                    )
                    .col(timestamp_with_time_zone(Products::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(Products::ModifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Products { Table, Id, Name, Description, Stock, Price, CreatedAt, ModifiedAt }

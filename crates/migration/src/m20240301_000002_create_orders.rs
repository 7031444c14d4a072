//! Create `orders` table.
//!
//! Product name is denormalized; there is no FK so orders survive product deletion.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(uuid(Orders::Id).primary_key())
                    .col(uuid(Orders::ProductId).not_null())
                    .col(string_len(Orders::ProductName, 50).not_null())
                    .col(string_len(Orders::Username, 64).not_null())
                    .col(
                        integer(Orders::Quantity)
                            .not_null()
                            .check(Expr::col(Orders::Quantity).gt(0)),
                    )
                    .col(
                        big_integer(Orders::Total)
                            .not_null()
                            .check(Expr::col(Orders::Total).gte(0)),
                    )
                    .col(string_len(Orders::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Orders::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(Orders::ModifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    ProductId,
    ProductName,
    Username,
    Quantity,
    Total,
    Status,
    CreatedAt,
    ModifiedAt,
}

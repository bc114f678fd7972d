//! Create sales_transactions table

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalesTransactions::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(SalesTransactions::SellerId).uuid().not_null())
                    .col(ColumnDef::new(SalesTransactions::BuyerId).uuid().not_null())
                    .col(
                        ColumnDef::new(SalesTransactions::AgreedPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactions::Status)
                            .string_len(20)
                            .not_null()
                            .default("payment_pending"),
                    )
                    .col(
                        ColumnDef::new(SalesTransactions::PaymentToken)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalesTransactions::PaymentUrl).string().not_null())
                    .col(
                        ColumnDef::new(SalesTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_transactions_vehicle")
                            .from(SalesTransactions::Table, SalesTransactions::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_transactions_vehicle")
                    .table(SalesTransactions::Table)
                    .col(SalesTransactions::VehicleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_transactions_buyer")
                    .table(SalesTransactions::Table)
                    .col(SalesTransactions::BuyerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_transactions_seller")
                    .table(SalesTransactions::Table)
                    .col(SalesTransactions::SellerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesTransactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SalesTransactions {
    Table,
    Id,
    VehicleId,
    SellerId,
    BuyerId,
    AgreedPrice,
    Status,
    PaymentToken,
    PaymentUrl,
    CreatedAt,
    UpdatedAt,
}

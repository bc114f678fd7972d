//! Create conversations table

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
                    .table(Conversations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conversations::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Conversations::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Conversations::VehicleId).uuid().not_null())
                    .col(
                        ColumnDef::new(Conversations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversations_vehicle")
                            .from(Conversations::Table, Conversations::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversations_participants")
                    .table(Conversations::Table)
                    .col(Conversations::CustomerId)
                    .col(Conversations::VendorId)
                    .col(Conversations::VehicleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversations_vendor")
                    .table(Conversations::Table)
                    .col(Conversations::VendorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Conversations {
    Table,
    Id,
    CustomerId,
    VendorId,
    VehicleId,
    CreatedAt,
    UpdatedAt,
}

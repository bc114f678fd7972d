//! Create vehicles table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vehicles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vehicles::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Vehicles::Brand).string().not_null())
                    .col(ColumnDef::new(Vehicles::Model).string().not_null())
                    .col(ColumnDef::new(Vehicles::Year).integer().not_null())
                    .col(ColumnDef::new(Vehicles::PlateNumber).string().not_null())
                    .col(ColumnDef::new(Vehicles::Color).string())
                    .col(ColumnDef::new(Vehicles::VehicleType).string_len(20).not_null())
                    .col(ColumnDef::new(Vehicles::Transmission).string_len(20).not_null())
                    .col(ColumnDef::new(Vehicles::FuelType).string_len(20).not_null())
                    .col(ColumnDef::new(Vehicles::Description).text())
                    .col(ColumnDef::new(Vehicles::Location).string())
                    .col(
                        ColumnDef::new(Vehicles::Features)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::IsForSale)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Vehicles::SalePrice).big_integer())
                    .col(
                        ColumnDef::new(Vehicles::IsForRent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Vehicles::RentalPriceDaily).big_integer())
                    .col(ColumnDef::new(Vehicles::RentalPriceWeekly).big_integer())
                    .col(ColumnDef::new(Vehicles::RentalPriceMonthly).big_integer())
                    .col(
                        ColumnDef::new(Vehicles::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_owner")
                            .from(Vehicles::Table, Vehicles::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_owner")
                    .table(Vehicles::Table)
                    .col(Vehicles::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_status")
                    .table(Vehicles::Table)
                    .col(Vehicles::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    OwnerId,
    Brand,
    Model,
    Year,
    PlateNumber,
    Color,
    VehicleType,
    Transmission,
    FuelType,
    Description,
    Location,
    Features,
    IsForSale,
    SalePrice,
    IsForRent,
    RentalPriceDaily,
    RentalPriceWeekly,
    RentalPriceMonthly,
    Status,
    CreatedAt,
    UpdatedAt,
}

//! Vehicle entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    #[sea_orm(nullable)]
    pub color: Option<String>,
    /// mobil | motor
    pub vehicle_type: String,
    /// matic | manual
    pub transmission: String,
    /// bensin | diesel | listrik
    pub fuel_type: String,
    #[sea_orm(nullable)]
    pub description: Option<String>,
    #[sea_orm(nullable)]
    pub location: Option<String>,
    /// JSON array of strings
    pub features: String,
    pub is_for_sale: bool,
    #[sea_orm(nullable)]
    pub sale_price: Option<i64>,
    pub is_for_rent: bool,
    #[sea_orm(nullable)]
    pub rental_price_daily: Option<i64>,
    #[sea_orm(nullable)]
    pub rental_price_weekly: Option<i64>,
    #[sea_orm(nullable)]
    pub rental_price_monthly: Option<i64>,
    /// available | sold
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

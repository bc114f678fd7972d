//! Vehicle DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::vehicle::model::{FuelType, Transmission, VehicleType};
use crate::domain::{Vehicle, VehicleListing};

/// Create / replace a listing
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VehicleRequest {
    #[validate(length(min = 1, max = 50, message = "brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, max = 50, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[validate(length(min = 1, max = 20, message = "plate_number is required"))]
    pub plate_number: String,
    pub color: Option<String>,
    /// mobil or motor
    pub vehicle_type: VehicleType,
    /// matic or manual
    pub transmission: Transmission,
    /// bensin, diesel or listrik
    pub fuel: FuelType,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_for_sale: bool,
    #[validate(range(min = 0))]
    pub sale_price: Option<i64>,
    #[serde(default)]
    pub is_for_rent: bool,
    #[validate(range(min = 0))]
    pub rental_price_daily: Option<i64>,
    #[validate(range(min = 0))]
    pub rental_price_weekly: Option<i64>,
    #[validate(range(min = 0))]
    pub rental_price_monthly: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<VehicleRequest> for VehicleListing {
    fn from(r: VehicleRequest) -> Self {
        Self {
            brand: r.brand,
            model: r.model,
            year: r.year,
            plate_number: r.plate_number,
            color: non_blank(r.color),
            vehicle_type: r.vehicle_type,
            transmission: r.transmission,
            fuel_type: r.fuel,
            description: non_blank(r.description),
            location: non_blank(r.location),
            features: r.features,
            is_for_sale: r.is_for_sale,
            sale_price: r.sale_price,
            is_for_rent: r.is_for_rent,
            rental_price_daily: r.rental_price_daily,
            rental_price_weekly: r.rental_price_weekly,
            rental_price_monthly: r.rental_price_monthly,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
    pub transmission: Transmission,
    pub fuel: FuelType,
    /// available or sold
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub features: Vec<String>,
    pub is_for_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<i64>,
    pub is_for_rent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_price_daily: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_price_weekly: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_price_monthly: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            owner_id: v.owner_id,
            brand: v.brand,
            model: v.model,
            year: v.year,
            plate_number: v.plate_number,
            color: v.color,
            vehicle_type: v.vehicle_type,
            transmission: v.transmission,
            fuel: v.fuel_type,
            status: v.status.as_str().to_string(),
            description: v.description,
            location: v.location,
            features: v.features,
            is_for_sale: v.is_for_sale,
            sale_price: v.sale_price,
            is_for_rent: v.is_for_rent,
            rental_price_daily: v.rental_price_daily,
            rental_price_weekly: v.rental_price_weekly,
            rental_price_monthly: v.rental_price_monthly,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

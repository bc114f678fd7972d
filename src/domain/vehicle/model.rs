//! Vehicle domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::errors::DomainError;

/// Listing status. `Sold` is terminal: a sold vehicle is retired from
/// both the rental and the sale side of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Available,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl FromStr for VehicleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            other => Err(DomainError::Validation(format!(
                "unknown vehicle status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generates `as_str` / `FromStr` for the simple lowercase catalog enums.
macro_rules! catalog_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(DomainError::Validation(format!(
                        "unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

catalog_enum!(VehicleType, "vehicle type", { Mobil => "mobil", Motor => "motor" });
catalog_enum!(Transmission, "transmission", { Matic => "matic", Manual => "manual" });
catalog_enum!(FuelType, "fuel type", { Bensin => "bensin", Diesel => "diesel", Listrik => "listrik" });

/// Owner-editable attributes of a listing.
#[derive(Debug, Clone)]
pub struct VehicleListing {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub description: Option<String>,
    pub location: Option<String>,
    pub features: Vec<String>,
    pub is_for_sale: bool,
    pub sale_price: Option<i64>,
    pub is_for_rent: bool,
    pub rental_price_daily: Option<i64>,
    pub rental_price_weekly: Option<i64>,
    pub rental_price_monthly: Option<i64>,
}

impl VehicleListing {
    /// A listing offered for sale or rent must carry the matching price.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_for_sale && self.sale_price.is_none() {
            return Err(DomainError::Validation(
                "sale_price is required when the vehicle is for sale".into(),
            ));
        }
        if self.is_for_rent && self.rental_price_daily.is_none() {
            return Err(DomainError::Validation(
                "rental_price_daily is required when the vehicle is for rent".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub description: Option<String>,
    pub location: Option<String>,
    pub features: Vec<String>,
    pub is_for_sale: bool,
    /// Smallest currency unit
    pub sale_price: Option<i64>,
    pub is_for_rent: bool,
    pub rental_price_daily: Option<i64>,
    pub rental_price_weekly: Option<i64>,
    pub rental_price_monthly: Option<i64>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(owner_id: Uuid, listing: VehicleListing) -> Self {
        let now = Utc::now();
        let VehicleListing {
            brand,
            model,
            year,
            plate_number,
            color,
            vehicle_type,
            transmission,
            fuel_type,
            description,
            location,
            features,
            is_for_sale,
            sale_price,
            is_for_rent,
            rental_price_daily,
            rental_price_weekly,
            rental_price_monthly,
        } = listing;

        Self {
            id: Uuid::new_v4(),
            owner_id,
            brand,
            model,
            year,
            plate_number,
            color,
            vehicle_type,
            transmission,
            fuel_type,
            description,
            location,
            features,
            is_for_sale,
            sale_price,
            is_for_rent,
            rental_price_daily,
            rental_price_weekly,
            rental_price_monthly,
            status: VehicleStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every owner-editable attribute.
    pub fn apply_listing(&mut self, listing: VehicleListing) {
        self.brand = listing.brand;
        self.model = listing.model;
        self.year = listing.year;
        self.plate_number = listing.plate_number;
        self.color = listing.color;
        self.vehicle_type = listing.vehicle_type;
        self.transmission = listing.transmission;
        self.fuel_type = listing.fuel_type;
        self.description = listing.description;
        self.location = listing.location;
        self.features = listing.features;
        self.is_for_sale = listing.is_for_sale;
        self.sale_price = listing.sale_price;
        self.is_for_rent = listing.is_for_rent;
        self.rental_price_daily = listing.rental_price_daily;
        self.rental_price_weekly = listing.rental_price_weekly;
        self.rental_price_monthly = listing.rental_price_monthly;
    }

    /// The owner-editable part of this vehicle.
    pub fn listing(&self) -> VehicleListing {
        VehicleListing {
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
            plate_number: self.plate_number.clone(),
            color: self.color.clone(),
            vehicle_type: self.vehicle_type,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            description: self.description.clone(),
            location: self.location.clone(),
            features: self.features.clone(),
            is_for_sale: self.is_for_sale,
            sale_price: self.sale_price,
            is_for_rent: self.is_for_rent,
            rental_price_daily: self.rental_price_daily,
            rental_price_weekly: self.rental_price_weekly,
            rental_price_monthly: self.rental_price_monthly,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_retired(&self) -> bool {
        self.status == VehicleStatus::Sold
    }

    /// Permanently withdraw the vehicle after a completed sale.
    pub fn retire(&mut self) {
        self.status = VehicleStatus::Sold;
        self.is_for_sale = false;
        self.is_for_rent = false;
    }
}

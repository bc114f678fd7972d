//! SeaORM implementation of VehicleRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{corrupt, db_err};
use crate::domain::{DomainError, DomainResult, Vehicle, VehicleRepository, VehicleStatus};
use crate::infrastructure::database::entities::vehicle;
use crate::shared::errors::InfraError;
use crate::shared::next_timestamp;

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: vehicle::Model) -> DomainResult<Vehicle> {
    let bad = |e: DomainError| corrupt("vehicles", e);
    let features: Vec<String> =
        serde_json::from_str(&m.features).map_err(|e| DomainError::from(InfraError::from(e)))?;

    Ok(Vehicle {
        id: m.id,
        owner_id: m.owner_id,
        brand: m.brand,
        model: m.model,
        year: m.year,
        plate_number: m.plate_number,
        color: m.color,
        vehicle_type: m.vehicle_type.parse().map_err(bad)?,
        transmission: m.transmission.parse().map_err(bad)?,
        fuel_type: m.fuel_type.parse().map_err(bad)?,
        description: m.description,
        location: m.location,
        features,
        is_for_sale: m.is_for_sale,
        sale_price: m.sale_price,
        is_for_rent: m.is_for_rent,
        rental_price_daily: m.rental_price_daily,
        rental_price_weekly: m.rental_price_weekly,
        rental_price_monthly: m.rental_price_monthly,
        status: m.status.parse().map_err(bad)?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(v: &Vehicle) -> DomainResult<vehicle::ActiveModel> {
    let mut active = listing_to_active(v)?;
    active.id = Set(v.id);
    active.owner_id = Set(v.owner_id);
    active.status = Set(v.status.as_str().to_string());
    active.created_at = Set(v.created_at);
    active.updated_at = Set(v.updated_at);
    Ok(active)
}

/// Only the owner-editable columns; status, owner and timestamps stay unset.
fn listing_to_active(v: &Vehicle) -> DomainResult<vehicle::ActiveModel> {
    let features =
        serde_json::to_string(&v.features).map_err(|e| DomainError::from(InfraError::from(e)))?;

    Ok(vehicle::ActiveModel {
        brand: Set(v.brand.clone()),
        model: Set(v.model.clone()),
        year: Set(v.year),
        plate_number: Set(v.plate_number.clone()),
        color: Set(v.color.clone()),
        vehicle_type: Set(v.vehicle_type.as_str().to_string()),
        transmission: Set(v.transmission.as_str().to_string()),
        fuel_type: Set(v.fuel_type.as_str().to_string()),
        description: Set(v.description.clone()),
        location: Set(v.location.clone()),
        features: Set(features),
        is_for_sale: Set(v.is_for_sale),
        sale_price: Set(v.sale_price),
        is_for_rent: Set(v.is_for_rent),
        rental_price_daily: Set(v.rental_price_daily),
        rental_price_weekly: Set(v.rental_price_weekly),
        rental_price_monthly: Set(v.rental_price_monthly),
        ..<vehicle::ActiveModel as ActiveModelTrait>::default()
    })
}

fn models_to_domain(models: Vec<vehicle::Model>) -> DomainResult<Vec<Vehicle>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn save(&self, v: &Vehicle) -> DomainResult<Vehicle> {
        debug!("Saving vehicle: {} (owner {})", v.id, v.owner_id);

        let inserted = domain_to_active(v)?
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        model_to_domain(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn update(&self, v: &Vehicle) -> DomainResult<Vehicle> {
        debug!("Updating vehicle: {}", v.id);

        let existing = vehicle::Entity::find_by_id(v.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Vehicle", v.id))?;

        let mut listing = listing_to_active(v)?;
        listing.updated_at = Set(next_timestamp(existing.updated_at));
        let result = vehicle::Entity::update_many()
            .set(listing)
            .filter(vehicle::Column::Id.eq(v.id))
            .filter(vehicle::Column::Status.eq(VehicleStatus::Available.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "vehicle {} has already been sold",
                v.id
            )));
        }

        self.find_by_id(v.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", v.id))
    }

    async fn retire(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        debug!("Retiring vehicle: {}", id);

        let Some(existing) = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let retired_at = next_timestamp(existing.updated_at);
        let mut active: vehicle::ActiveModel = existing.into();
        active.status = Set(VehicleStatus::Sold.as_str().to_string());
        active.is_for_sale = Set(false);
        active.is_for_rent = Set(false);
        active.updated_at = Set(retired_at);
        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated).map(Some)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        debug!("Deleting vehicle: {}", id);

        let result = vehicle::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_available(&self) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .filter(vehicle::Column::Status.eq(VehicleStatus::Available.as_str()))
            .order_by_desc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .filter(vehicle::Column::OwnerId.eq(owner_id))
            .order_by_desc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .order_by_desc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

//! SeaORM implementation of BookingRepository

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{corrupt, db_err};
use crate::domain::{
    Booking, BookingRepository, BookingStatus, DateRange, DomainError, DomainResult,
};
use crate::infrastructure::database::entities::{booking, vehicle};
use crate::shared::next_timestamp;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
    /// One lock per vehicle so overlap check + insert never interleave
    /// for the same vehicle inside this process.
    vehicle_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            vehicle_locks: DashMap::new(),
        }
    }

    fn vehicle_lock(&self, vehicle_id: Uuid) -> Arc<Mutex<()>> {
        self.vehicle_locks.entry(vehicle_id).or_default().clone()
    }

    /// Drop the vehicle's lock once no caller holds or waits on it.
    fn release_vehicle_lock(&self, vehicle_id: Uuid, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.vehicle_locks
            .remove_if(&vehicle_id, |_, l| Arc::strong_count(l) == 1);
    }

    /// Overlap check and insert in one transaction. Callers hold the
    /// vehicle's lock.
    async fn insert_if_free(&self, b: &Booking) -> DomainResult<Booking> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let overlaps = count_blocking_overlaps(&txn, b.vehicle_id, &b.range()).await?;
        if overlaps > 0 {
            debug!(
                "Booking rejected: vehicle {} has {} overlapping booking(s)",
                b.vehicle_id, overlaps
            );
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(
                "vehicle is already booked for the requested dates".into(),
            ));
        }

        let model = booking::ActiveModel {
            id: Set(b.id),
            user_id: Set(b.user_id),
            vehicle_id: Set(b.vehicle_id),
            start_date: Set(b.start_date),
            end_date: Set(b.end_date),
            total_price: Set(b.total_price),
            status: Set(b.status.as_str().to_string()),
            payment_token: Set(b.payment_token.clone()),
            payment_url: Set(b.payment_url.clone()),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        debug!("Saved booking {} for vehicle {}", b.id, b.vehicle_id);
        model_to_domain(inserted)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    Ok(Booking {
        id: m.id,
        user_id: m.user_id,
        vehicle_id: m.vehicle_id,
        start_date: m.start_date,
        end_date: m.end_date,
        total_price: m.total_price,
        status: m.status.parse().map_err(|e| corrupt("bookings", e))?,
        payment_token: m.payment_token,
        payment_url: m.payment_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

fn blocking_statuses() -> Vec<&'static str> {
    BookingStatus::BLOCKING.iter().map(|s| s.as_str()).collect()
}

async fn count_blocking_overlaps<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
    range: &DateRange,
) -> DomainResult<u64> {
    booking::Entity::find()
        .filter(booking::Column::VehicleId.eq(vehicle_id))
        .filter(booking::Column::Status.is_in(blocking_statuses()))
        .filter(booking::Column::StartDate.lte(range.end()))
        .filter(booking::Column::EndDate.gte(range.start()))
        .count(conn)
        .await
        .map_err(db_err)
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create_if_available(&self, b: &Booking) -> DomainResult<Booking> {
        let lock = self.vehicle_lock(b.vehicle_id);
        let result = {
            let _guard = lock.lock().await;
            self.insert_if_free(b).await
        };
        self.release_vehicle_lock(b.vehicle_id, lock);
        result
    }

    async fn has_blocking_overlap(
        &self,
        vehicle_id: Uuid,
        range: &DateRange,
    ) -> DomainResult<bool> {
        Ok(count_blocking_overlaps(&self.db, vehicle_id, range).await? > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_renter(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_vehicle_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .join(JoinType::InnerJoin, booking::Relation::Vehicle.def())
            .filter(vehicle::Column::OwnerId.eq(owner_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>> {
        let Some(current) = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        if current.status != expected.as_str() {
            return Ok(None);
        }

        let updated_at = next_timestamp(current.updated_at);
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(next.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(updated_at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            debug!("Booking {} left '{}' before the update landed", id, expected);
            return Ok(None);
        }

        debug!("Booking {}: {} -> {}", id, expected, next);
        let mut updated = model_to_domain(current)?;
        updated.status = next;
        updated.updated_at = updated_at;
        Ok(Some(updated))
    }

    async fn has_open_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool> {
        let open: Vec<&str> = BookingStatus::OPEN.iter().map(|s| s.as_str()).collect();
        let count = booking::Entity::find()
            .filter(booking::Column::VehicleId.eq(vehicle_id))
            .filter(booking::Column::Status.is_in(open))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}

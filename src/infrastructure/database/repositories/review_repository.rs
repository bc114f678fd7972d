//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, insert_err};
use crate::domain::{DomainResult, Review, ReviewRepository};
use crate::infrastructure::database::entities::review;

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: review::Model) -> Review {
    Review {
        id: m.id,
        booking_id: m.booking_id,
        user_id: m.user_id,
        vehicle_id: m.vehicle_id,
        rating: m.rating,
        comment: m.comment,
        created_at: m.created_at,
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn save(&self, r: &Review) -> DomainResult<Review> {
        debug!("Saving review {} for booking {}", r.id, r.booking_id);

        let model = review::ActiveModel {
            id: Set(r.id),
            booking_id: Set(r.booking_id),
            user_id: Set(r.user_id),
            vehicle_id: Set(r.vehicle_id),
            rating: Set(r.rating),
            comment: Set(r.comment.clone()),
            created_at: Set(r.created_at),
        };
        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| insert_err(e, "booking has already been reviewed"))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Option<Review>> {
        let model = review::Entity::find()
            .filter(review::Column::BookingId.eq(booking_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

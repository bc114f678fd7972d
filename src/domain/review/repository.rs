use async_trait::async_trait;
use uuid::Uuid;

use super::Review;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with `Conflict` when the booking already has a review.
    async fn save(&self, review: &Review) -> DomainResult<Review>;

    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Option<Review>>;

    /// Newest first
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<Review>>;
}

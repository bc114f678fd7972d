//! Reviews of completed rentals

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{BookingStatus, DomainError, DomainResult, RepositoryProvider, Review};

pub struct ReviewService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ReviewService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Rate a completed booking. One review per booking, by its renter.
    pub async fn create_review(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> DomainResult<Review> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        if !booking.is_renter(reviewer_id) {
            return Err(DomainError::Forbidden(
                "only the renter can review this booking".into(),
            ));
        }
        if booking.status != BookingStatus::Completed {
            return Err(DomainError::Conflict(
                "only completed bookings can be reviewed".into(),
            ));
        }
        if self.repos.reviews().find_by_booking(booking_id).await?.is_some() {
            return Err(DomainError::Conflict("booking has already been reviewed".into()));
        }

        let review = Review::new(booking_id, reviewer_id, booking.vehicle_id, rating, comment)?;
        let review = self.repos.reviews().save(&review).await?;
        info!(
            review_id = %review.id,
            booking_id = %booking_id,
            rating,
            "Review submitted"
        );
        Ok(review)
    }

    pub async fn reviews_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<Review>> {
        self.repos.reviews().find_by_vehicle(vehicle_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::{self, World};
    use crate::domain::{Booking, DateRange};

    async fn booking_in(world: &World, path: &[BookingStatus]) -> Booking {
        let range = DateRange::parse("2024-02-01", "2024-02-03").unwrap();
        let booking = Booking::pending(
            Uuid::new_v4(),
            world.customer.id,
            world.vehicle.id,
            range,
            300_000,
            "BOOK-r",
            "https://pay.example/r",
        );
        let mut booking = world.repos.bookings().create_if_available(&booking).await.unwrap();
        let mut current = BookingStatus::PendingPayment;
        for next in path {
            booking = world
                .repos
                .bookings()
                .transition_status(booking.id, current, *next)
                .await
                .unwrap()
                .unwrap();
            current = *next;
        }
        booking
    }

    const COMPLETED: &[BookingStatus] = &[
        BookingStatus::Confirmed,
        BookingStatus::RentedOut,
        BookingStatus::Completed,
    ];

    #[tokio::test]
    async fn renter_reviews_completed_booking_once() {
        let world = fixtures::world().await;
        let svc = ReviewService::new(world.provider());
        let booking = booking_in(&world, COMPLETED).await;

        let review = svc
            .create_review(booking.id, world.customer.id, 5, Some("smooth".into()))
            .await
            .unwrap();
        assert_eq!(review.vehicle_id, world.vehicle.id);

        assert!(matches!(
            svc.create_review(booking.id, world.customer.id, 4, None).await,
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(svc.reviews_for_vehicle(world.vehicle.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_strangers_and_unfinished_bookings() {
        let world = fixtures::world().await;
        let svc = ReviewService::new(world.provider());

        let confirmed = booking_in(&world, &[BookingStatus::Confirmed]).await;
        assert!(matches!(
            svc.create_review(confirmed.id, world.customer.id, 5, None).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            svc.create_review(confirmed.id, world.vendor.id, 5, None).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.create_review(Uuid::new_v4(), world.customer.id, 5, None).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn rating_out_of_range() {
        let world = fixtures::world().await;
        let svc = ReviewService::new(world.provider());
        let booking = booking_in(&world, COMPLETED).await;
        assert!(matches!(
            svc.create_review(booking.id, world.customer.id, 6, None).await,
            Err(DomainError::Validation(_))
        ));
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use super::{Booking, BookingStatus, DateRange};
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert `booking` unless a blocking booking of the same vehicle
    /// overlaps its range. The overlap check and the insert happen as one
    /// atomic step; an overlap yields `Conflict`.
    async fn create_if_available(&self, booking: &Booking) -> DomainResult<Booking>;

    /// Whether any `confirmed` or `rented_out` booking of the vehicle
    /// overlaps `range`.
    async fn has_blocking_overlap(&self, vehicle_id: Uuid, range: &DateRange)
        -> DomainResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>>;

    /// Bookings made by a renter, newest first
    async fn find_by_renter(&self, user_id: Uuid) -> DomainResult<Vec<Booking>>;

    /// Bookings of every vehicle owned by `owner_id`, newest first
    async fn find_by_vehicle_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Booking>>;

    /// Compare-and-set: move the booking from `expected` to `next`.
    /// `None` when the booking is missing or no longer in `expected`.
    async fn transition_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>>;

    /// Whether the vehicle has a booking that is not yet finished
    async fn has_open_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool>;
}

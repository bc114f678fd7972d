//! Booking lifecycle engine
//!
//! Creates bookings, prices them and drives them through
//! `pending_payment → confirmed → rented_out → completed` (or
//! `confirmed → cancelled`). Every decision is taken against freshly
//! loaded records; the service itself holds no state.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::availability::AvailabilityOracle;
use crate::application::payments::PaymentLinks;
use crate::domain::{
    Booking, BookingStatus, DateRange, DomainError, DomainResult, RepositoryProvider, Vehicle,
};
use crate::observability::{
    BOOKINGS_CREATED_TOTAL, BOOKING_CONFLICTS_TOTAL, BOOKING_TRANSITIONS_TOTAL,
};

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    oracle: AvailabilityOracle,
    payments: PaymentLinks,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, payments: PaymentLinks) -> Self {
        Self {
            oracle: AvailabilityOracle::new(repos.clone()),
            repos,
            payments,
        }
    }

    async fn load_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))
    }

    async fn load_booking(&self, booking_id: Uuid) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))
    }

    // ── Creation ────────────────────────────────────────────────

    /// Reserve `vehicle_id` for the inclusive `YYYY-MM-DD` range. The new
    /// booking waits for payment and carries its payment link.
    pub async fn create_booking(
        &self,
        vehicle_id: Uuid,
        start_date: &str,
        end_date: &str,
        renter_id: Uuid,
    ) -> DomainResult<Booking> {
        let range = DateRange::parse(start_date, end_date)?;

        if !self.oracle.is_available(vehicle_id, &range).await? {
            metrics::counter!(BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(DomainError::Conflict(
                "vehicle is already booked for the requested dates".into(),
            ));
        }

        let vehicle = self.load_vehicle(vehicle_id).await?;
        let daily_rate = vehicle.rental_price_daily.ok_or_else(|| {
            DomainError::Validation("vehicle has no daily rental price".into())
        })?;
        if vehicle.is_retired() || !vehicle.is_for_rent {
            return Err(DomainError::Conflict("vehicle is not offered for rent".into()));
        }

        let total_price = range.price(daily_rate)?;
        let id = Uuid::new_v4();
        let link = self.payments.for_booking(id);
        let booking = Booking::pending(
            id,
            renter_id,
            vehicle_id,
            range,
            total_price,
            link.token,
            link.url,
        );

        let booking = match self.repos.bookings().create_if_available(&booking).await {
            Ok(saved) => saved,
            Err(e @ DomainError::Conflict(_)) => {
                metrics::counter!(BOOKING_CONFLICTS_TOTAL).increment(1);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        metrics::counter!(BOOKINGS_CREATED_TOTAL).increment(1);
        info!(
            booking_id = %booking.id,
            vehicle_id = %vehicle_id,
            renter_id = %renter_id,
            days = range.days(),
            total_price,
            "Booking created, awaiting payment"
        );
        Ok(booking)
    }

    // ── Payment callback ────────────────────────────────────────

    /// Apply a successful payment: `pending_payment → confirmed`.
    ///
    /// A booking that already left `pending_payment` is returned unchanged,
    /// so duplicate or late callbacks are harmless. Dates are not
    /// re-checked here.
    pub async fn confirm_payment(&self, booking_id: Uuid) -> DomainResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        if booking.status != BookingStatus::PendingPayment {
            debug!(
                booking_id = %booking_id,
                status = %booking.status,
                "Payment callback for booking past pending_payment, ignoring"
            );
            return Ok(booking);
        }

        match self
            .repos
            .bookings()
            .transition_status(booking_id, BookingStatus::PendingPayment, BookingStatus::Confirmed)
            .await?
        {
            Some(confirmed) => {
                info!(booking_id = %booking_id, "Booking payment confirmed");
                Ok(confirmed)
            }
            // A concurrent callback won; report whatever it left behind.
            None => self.load_booking(booking_id).await,
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Visible to the renter and to the vehicle's owner only.
    pub async fn get_by_id(&self, booking_id: Uuid, requester_id: Uuid) -> DomainResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        if booking.is_renter(requester_id) {
            return Ok(booking);
        }

        let vehicle = self.load_vehicle(booking.vehicle_id).await?;
        if vehicle.is_owned_by(requester_id) {
            Ok(booking)
        } else {
            Err(DomainError::Forbidden(
                "only the renter or the vehicle owner may view this booking".into(),
            ))
        }
    }

    pub async fn list_for_renter(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_by_renter(user_id).await
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_by_vehicle_owner(owner_id).await
    }

    // ── Owner transitions ───────────────────────────────────────

    /// Owner-driven transition. Only `confirmed → rented_out`,
    /// `confirmed → cancelled` and `rented_out → completed` are accepted.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        requester_id: Uuid,
        new_status: BookingStatus,
    ) -> DomainResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        let vehicle = self.load_vehicle(booking.vehicle_id).await?;
        if !vehicle.is_owned_by(requester_id) {
            return Err(DomainError::Forbidden(
                "only the vehicle owner may change a booking's status".into(),
            ));
        }

        booking.status.ensure_transition(new_status)?;

        let updated = self
            .repos
            .bookings()
            .transition_status(booking_id, booking.status, new_status)
            .await?
            .ok_or_else(|| {
                warn!(
                    booking_id = %booking_id,
                    expected = %booking.status,
                    "Booking changed while being updated"
                );
                DomainError::Conflict(format!(
                    "booking {} was modified concurrently, reload and retry",
                    booking_id
                ))
            })?;

        metrics::counter!(BOOKING_TRANSITIONS_TOTAL, "to" => new_status.as_str()).increment(1);
        info!(
            booking_id = %booking_id,
            from = %booking.status,
            to = %new_status,
            "Booking status updated"
        );
        Ok(updated)
    }
}

// ── Tests ──────────────────────────────────────────────────────

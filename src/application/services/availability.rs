//! Availability oracle

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{DateRange, DomainResult, RepositoryProvider};

/// Answers whether a vehicle is free for an inclusive date range.
///
/// Only `confirmed` and `rented_out` bookings occupy dates; a booking that
/// is still waiting for payment does not. The answer is advisory: the
/// store repeats the check atomically when a booking is inserted.
#[derive(Clone)]
pub struct AvailabilityOracle {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityOracle {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn is_available(&self, vehicle_id: Uuid, range: &DateRange) -> DomainResult<bool> {
        let taken = self
            .repos
            .bookings()
            .has_blocking_overlap(vehicle_id, range)
            .await?;
        Ok(!taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Booking, BookingStatus};
    use crate::infrastructure::InMemoryStorage;

    /// Insert a booking and walk it to `status` through legal transitions.
    async fn booked(repos: &InMemoryStorage, vehicle_id: Uuid, status: BookingStatus) {
        use BookingStatus::*;

        let b = Booking::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vehicle_id,
            DateRange::parse("2024-01-10", "2024-01-15").unwrap(),
            100,
            "t",
            "u",
        );
        repos.bookings().create_if_available(&b).await.unwrap();

        let path: &[(BookingStatus, BookingStatus)] = match status {
            PendingPayment => &[],
            Confirmed => &[(PendingPayment, Confirmed)],
            RentedOut => &[(PendingPayment, Confirmed), (Confirmed, RentedOut)],
            Completed => &[
                (PendingPayment, Confirmed),
                (Confirmed, RentedOut),
                (RentedOut, Completed),
            ],
            Cancelled => &[(PendingPayment, Confirmed), (Confirmed, Cancelled)],
        };
        for (from, to) in path {
            repos
                .bookings()
                .transition_status(b.id, *from, *to)
                .await
                .unwrap()
                .unwrap();
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[tokio::test]
    async fn confirmed_booking_blocks_overlap_only() {
        let repos = Arc::new(InMemoryStorage::new());
        let vehicle = Uuid::new_v4();
        booked(&repos, vehicle, BookingStatus::Confirmed).await;
        let oracle = AvailabilityOracle::new(repos);

        assert!(!oracle
            .is_available(vehicle, &range("2024-01-14", "2024-01-20"))
            .await
            .unwrap());
        assert!(oracle
            .is_available(vehicle, &range("2024-01-16", "2024-01-20"))
            .await
            .unwrap());
        assert!(oracle
            .is_available(Uuid::new_v4(), &range("2024-01-10", "2024-01-15"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn rented_out_blocks_but_other_statuses_do_not() {
        let repos = Arc::new(InMemoryStorage::new());
        let cases = [
            (BookingStatus::RentedOut, false),
            (BookingStatus::Completed, true),
            (BookingStatus::Cancelled, true),
            (BookingStatus::PendingPayment, true),
        ];
        let mut vehicles = Vec::new();
        for (status, _) in cases {
            let vehicle = Uuid::new_v4();
            booked(&repos, vehicle, status).await;
            vehicles.push(vehicle);
        }

        let oracle = AvailabilityOracle::new(repos);
        let wanted = range("2024-01-12", "2024-01-12");
        for ((status, expected), vehicle) in cases.into_iter().zip(vehicles) {
            assert_eq!(
                oracle.is_available(vehicle, &wanted).await.unwrap(),
                expected,
                "status {}",
                status
            );
        }
    }
}

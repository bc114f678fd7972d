//! Booking domain entity and its lifecycle rules

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::shared::errors::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Booking status
///
/// ```text
/// pending_payment ──payment──▶ confirmed ──▶ rented_out ──▶ completed
///                                  │
///                                  └──▶ cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Created, waiting for the payment callback
    PendingPayment,
    /// Paid; the dates are now reserved
    Confirmed,
    /// Vehicle handed over to the renter
    RentedOut,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::PendingPayment,
        Self::Confirmed,
        Self::RentedOut,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses that reserve the booked dates.
    pub const BLOCKING: [BookingStatus; 2] = [Self::Confirmed, Self::RentedOut];

    /// Statuses that keep a vehicle from being deleted.
    pub const OPEN: [BookingStatus; 3] =
        [Self::PendingPayment, Self::Confirmed, Self::RentedOut];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Confirmed => "confirmed",
            Self::RentedOut => "rented_out",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn blocks_availability(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    /// Transitions a vehicle owner may request. `pending_payment →
    /// confirmed` is reserved for the payment callback.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::RentedOut)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::RentedOut, Self::Completed)
        )
    }

    pub fn ensure_transition(&self, next: BookingStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown booking status '{}'", s)))
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive calendar date range, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::Validation(
                "end_date must be on or after start_date".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(parse_date("start_date", start)?, parse_date("end_date", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both ends inclusive: ranges touching on a single day overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of billable days, counting both ends. Never less than 1.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    /// Rental price for the whole range at `daily_rate`.
    pub fn price(&self, daily_rate: i64) -> Result<i64, DomainError> {
        self.days()
            .checked_mul(daily_rate)
            .ok_or_else(|| DomainError::Validation("total price out of range".into()))
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        DomainError::Validation(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    })
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    /// Renter
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_token: String,
    pub payment_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A new booking waiting for payment.
    pub fn pending(
        id: Uuid,
        user_id: Uuid,
        vehicle_id: Uuid,
        range: DateRange,
        total_price: i64,
        payment_token: impl Into<String>,
        payment_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            vehicle_id,
            start_date: range.start,
            end_date: range.end,
            total_price,
            status: BookingStatus::PendingPayment,
            payment_token: payment_token.into(),
            payment_url: payment_url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn is_renter(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

// ── Tests ──────────────────────────────────────────────────────

//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Booking;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    /// Inclusive, `YYYY-MM-DD`
    #[validate(length(min = 1, message = "start_date is required"))]
    pub start_date: String,
    /// Inclusive, `YYYY-MM-DD`
    #[validate(length(min = 1, message = "end_date is required"))]
    pub end_date: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// rented_out, completed or cancelled
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub status: String,
    pub payment_token: String,
    pub payment_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            vehicle_id: b.vehicle_id,
            start_date: b.start_date,
            end_date: b.end_date,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            payment_token: b.payment_token,
            payment_url: b.payment_url,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

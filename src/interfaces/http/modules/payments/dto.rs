//! Payment callback DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingCallbackRequest {
    pub booking_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaleCallbackRequest {
    pub transaction_id: String,
    pub status: String,
}

/// Acknowledgement returned to the payment collaborator
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallbackAck {
    pub id: Uuid,
    /// `success` when applied, `ignored` otherwise
    pub outcome: String,
    /// Record status after the callback, when it was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

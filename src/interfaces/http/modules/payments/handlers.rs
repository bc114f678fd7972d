//! Payment callback handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{BookingCallbackRequest, CallbackAck, SaleCallbackRequest};
use crate::application::{BookingService, PaymentOutcome, SalesService};
use crate::domain::DomainError;
use crate::interfaces::http::common::{api_error, bad_request, ok, ApiError, ApiResponse, ApiResult};
use crate::observability::PAYMENT_CALLBACKS_TOTAL;

#[derive(Clone)]
pub struct PaymentHandlerState {
    pub booking_service: Arc<BookingService>,
    pub sales_service: Arc<SalesService>,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| bad_request(format!("Invalid {} format", what)))
}

/// Unknown ids are reported as server errors so the collaborator retries
/// and the mismatch is surfaced.
fn callback_error(error: DomainError) -> ApiError {
    match error {
        DomainError::NotFound { .. } => {
            warn!(error = %error, "Payment callback for an unknown record");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(error.to_string())),
            )
        }
        other => api_error(other),
    }
}

fn record(kind: &'static str, outcome: &PaymentOutcome) {
    metrics::counter!(PAYMENT_CALLBACKS_TOTAL, "kind" => kind, "outcome" => outcome.label())
        .increment(1);
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/callback",
    tag = "Payments",
    request_body = BookingCallbackRequest,
    responses(
        (status = 200, description = "Callback acknowledged", body = ApiResponse<CallbackAck>),
        (status = 400, description = "Malformed callback"),
        (status = 500, description = "Unknown booking")
    )
)]
pub async fn booking_payment_callback(
    State(state): State<PaymentHandlerState>,
    payload: Result<Json<BookingCallbackRequest>, JsonRejection>,
) -> ApiResult<CallbackAck> {
    let Json(request) = payload.map_err(|e| bad_request(format!("Invalid callback data: {}", e)))?;
    let booking_id = parse_id(&request.booking_id, "booking ID")?;

    let outcome = PaymentOutcome::from_status(&request.status);
    record("booking", &outcome);

    match outcome {
        PaymentOutcome::Succeeded => {
            let booking = state
                .booking_service
                .confirm_payment(booking_id)
                .await
                .map_err(callback_error)?;
            ok(CallbackAck {
                id: booking_id,
                outcome: outcome.label().to_string(),
                status: Some(booking.status.as_str().to_string()),
            })
        }
        PaymentOutcome::NotSucceeded(status) => {
            info!(booking_id = %booking_id, status = %status, "Non-success booking payment ignored");
            ok(CallbackAck {
                id: booking_id,
                outcome: "ignored".to_string(),
                status: None,
            })
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/callback",
    tag = "Payments",
    request_body = SaleCallbackRequest,
    responses(
        (status = 200, description = "Callback acknowledged", body = ApiResponse<CallbackAck>),
        (status = 400, description = "Malformed callback"),
        (status = 409, description = "Vehicle already sold to another buyer"),
        (status = 500, description = "Unknown transaction or completion failure")
    )
)]
pub async fn sale_payment_callback(
    State(state): State<PaymentHandlerState>,
    payload: Result<Json<SaleCallbackRequest>, JsonRejection>,
) -> ApiResult<CallbackAck> {
    let Json(request) = payload.map_err(|e| bad_request(format!("Invalid callback data: {}", e)))?;
    let transaction_id = parse_id(&request.transaction_id, "transaction ID")?;

    let outcome = PaymentOutcome::from_status(&request.status);
    record("sale", &outcome);

    match outcome {
        PaymentOutcome::Succeeded => {
            let transaction = state
                .sales_service
                .confirm_sale(transaction_id)
                .await
                .map_err(callback_error)?;
            ok(CallbackAck {
                id: transaction_id,
                outcome: outcome.label().to_string(),
                status: Some(transaction.status.as_str().to_string()),
            })
        }
        PaymentOutcome::NotSucceeded(status) => {
            info!(transaction_id = %transaction_id, status = %status, "Non-success sale payment ignored");
            ok(CallbackAck {
                id: transaction_id,
                outcome: "ignored".to_string(),
                status: None,
            })
        }
    }
}

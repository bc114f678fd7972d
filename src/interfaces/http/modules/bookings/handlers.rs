//! Booking API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{BookingDto, CreateBookingRequest, UpdateBookingStatusRequest};
use crate::application::BookingService;
use crate::domain::BookingStatus;
use crate::interfaces::http::common::{
    api_error, bad_request, ok, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Statuses an owner may request
const OWNER_STATUSES: [BookingStatus; 3] = [
    BookingStatus::RentedOut,
    BookingStatus::Completed,
    BookingStatus::Cancelled,
];

#[derive(Clone)]
pub struct BookingHandlerState {
    pub booking_service: Arc<BookingService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created, awaiting payment", body = ApiResponse<BookingDto>),
        (status = 400, description = "Invalid dates"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Vehicle not available for the dates")
    )
)]
pub async fn create_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError> {
    let booking = state
        .booking_service
        .create_booking(
            request.vehicle_id,
            &request.start_date,
            &request.end_date,
            user.user_id,
        )
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(booking.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/my-bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<Vec<BookingDto>>)
    )
)]
pub async fn my_bookings(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<BookingDto>> {
    let bookings = state
        .booking_service
        .list_for_renter(user.user_id)
        .await
        .map_err(api_error)?;
    ok(bookings.into_iter().map(BookingDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/vendor",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookings on the caller's vehicles", body = ApiResponse<Vec<BookingDto>>)
    )
)]
pub async fn vendor_bookings(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<BookingDto>> {
    let bookings = state
        .booking_service
        .list_for_owner(user.user_id)
        .await
        .map_err(api_error)?;
    ok(bookings.into_iter().map(BookingDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingDto>),
        (status = 403, description = "Neither renter nor vehicle owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<BookingDto> {
    let booking = state
        .booking_service
        .get_by_id(id, user.user_id)
        .await
        .map_err(api_error)?;
    ok(booking.into())
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<BookingDto>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not the vehicle owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_booking_status(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBookingStatusRequest>,
) -> ApiResult<BookingDto> {
    let status = request
        .status
        .parse::<BookingStatus>()
        .ok()
        .filter(|s| OWNER_STATUSES.contains(s))
        .ok_or_else(|| bad_request("status must be one of: rented_out, completed, cancelled"))?;

    let booking = state
        .booking_service
        .update_status(id, user.user_id, status)
        .await
        .map_err(api_error)?;
    ok(booking.into())
}

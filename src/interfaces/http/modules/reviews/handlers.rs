//! Review API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{CreateReviewRequest, ReviewDto};
use crate::application::ReviewService;
use crate::interfaces::http::common::{api_error, ok, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReviewHandlerState {
    pub review_service: Arc<ReviewService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ApiResponse<ReviewDto>),
        (status = 403, description = "Not the renter"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking not completed or already reviewed")
    )
)]
pub async fn create_review(
    State(state): State<ReviewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ApiError> {
    let review = state
        .review_service
        .create_review(booking_id, user.user_id, request.rating, request.comment)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<Vec<ReviewDto>>)
    )
)]
pub async fn vehicle_reviews(
    State(state): State<ReviewHandlerState>,
    Path(vehicle_id): Path<Uuid>,
) -> ApiResult<Vec<ReviewDto>> {
    let reviews = state
        .review_service
        .reviews_for_vehicle(vehicle_id)
        .await
        .map_err(api_error)?;
    ok(reviews.into_iter().map(ReviewDto::from).collect())
}

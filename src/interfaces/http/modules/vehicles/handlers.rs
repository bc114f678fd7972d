//! Vehicle API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{VehicleDto, VehicleRequest};
use crate::application::VehicleService;
use crate::interfaces::http::common::{api_error, ok, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct VehicleHandlerState {
    pub vehicle_service: Arc<VehicleService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Vehicles on the market, newest first", body = ApiResponse<Vec<VehicleDto>>)
    )
)]
pub async fn list_vehicles(State(state): State<VehicleHandlerState>) -> ApiResult<Vec<VehicleDto>> {
    let vehicles = state
        .vehicle_service
        .list_available()
        .await
        .map_err(api_error)?;
    ok(vehicles.into_iter().map(VehicleDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle details", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<VehicleHandlerState>,
    Path(id): Path<Uuid>,
) -> ApiResult<VehicleDto> {
    let vehicle = state.vehicle_service.get(id).await.map_err(api_error)?;
    ok(vehicle.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/my-listings",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's listings", body = ApiResponse<Vec<VehicleDto>>),
        (status = 403, description = "Vendors only")
    )
)]
pub async fn my_listings(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<VehicleDto>> {
    let vehicles = state
        .vehicle_service
        .list_by_owner(user.user_id)
        .await
        .map_err(api_error)?;
    ok(vehicles.into_iter().map(VehicleDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = VehicleRequest,
    responses(
        (status = 201, description = "Vehicle listed", body = ApiResponse<VehicleDto>),
        (status = 400, description = "Invalid listing"),
        (status = 403, description = "Unverified vendor")
    )
)]
pub async fn create_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<VehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleDto>>), ApiError> {
    let vehicle = state
        .vehicle_service
        .create(user.user_id, request.into())
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    request_body = VehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = ApiResponse<VehicleDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Vehicle already sold")
    )
)]
pub async fn update_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<VehicleRequest>,
) -> ApiResult<VehicleDto> {
    let vehicle = state
        .vehicle_service
        .update(id, user.user_id, request.into())
        .await
        .map_err(api_error)?;
    ok(vehicle.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Vehicle has open bookings or a pending sale")
    )
)]
pub async fn delete_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state
        .vehicle_service
        .delete(id, user.user_id)
        .await
        .map_err(api_error)?;
    ok(())
}

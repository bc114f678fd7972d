//! Admin API handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::application::{UserService, VehicleService};
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::modules::auth::UserDto;
use crate::interfaces::http::modules::vehicles::VehicleDto;

#[derive(Clone)]
pub struct AdminHandlerState {
    pub user_service: Arc<UserService>,
    pub vehicle_service: Arc<VehicleService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/vendors",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Vendor accounts, newest first", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_vendors(State(state): State<AdminHandlerState>) -> ApiResult<Vec<UserDto>> {
    let vendors = state
        .user_service
        .list_vendors()
        .await
        .map_err(api_error)?;
    ok(vendors.into_iter().map(UserDto::from).collect())
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/vendors/{id}/verify",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor user ID")),
    responses(
        (status = 200, description = "Vendor verified", body = ApiResponse<UserDto>),
        (status = 400, description = "User is not a vendor"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn verify_vendor(
    State(state): State<AdminHandlerState>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserDto> {
    let user = state
        .user_service
        .verify_vendor(id)
        .await
        .map_err(api_error)?;
    ok(user.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts, newest first", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(State(state): State<AdminHandlerState>) -> ApiResult<Vec<UserDto>> {
    let users = state.user_service.list_users().await.map_err(api_error)?;
    ok(users.into_iter().map(UserDto::from).collect())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and their records deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Admin account, or a rental or purchase in progress")
    )
)]
pub async fn delete_user(
    State(state): State<AdminHandlerState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.user_service.delete_user(id).await.map_err(api_error)?;
    ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/vehicles",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every listing including sold ones", body = ApiResponse<Vec<VehicleDto>>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_vehicles(State(state): State<AdminHandlerState>) -> ApiResult<Vec<VehicleDto>> {
    let vehicles = state
        .vehicle_service
        .list_all()
        .await
        .map_err(api_error)?;
    ok(vehicles.into_iter().map(VehicleDto::from).collect())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/vehicles/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Vehicle has open bookings or a pending sale")
    )
)]
pub async fn delete_vehicle(
    State(state): State<AdminHandlerState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state
        .vehicle_service
        .delete_any(id)
        .await
        .map_err(api_error)?;
    ok(())
}

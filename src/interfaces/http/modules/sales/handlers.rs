//! Sales API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::SalesTransactionDto;
use crate::application::SalesService;
use crate::interfaces::http::common::{api_error, ok, ApiError, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct SalesHandlerState {
    pub sales_service: Arc<SalesService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{id}/purchase",
    tag = "Sales",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 201, description = "Purchase opened, awaiting payment", body = ApiResponse<SalesTransactionDto>),
        (status = 400, description = "Vehicle has no sale price"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Vehicle not for sale, already sold, or owned by the caller")
    )
)]
pub async fn initiate_purchase(
    State(state): State<SalesHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<SalesTransactionDto>>), ApiError> {
    let transaction = state
        .sales_service
        .initiate_purchase(vehicle_id, user.user_id)
        .await
        .map_err(api_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(transaction.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/purchases",
    tag = "Sales",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's purchases", body = ApiResponse<Vec<SalesTransactionDto>>)
    )
)]
pub async fn my_purchases(
    State(state): State<SalesHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<SalesTransactionDto>> {
    let purchases = state
        .sales_service
        .purchases_by_buyer(user.user_id)
        .await
        .map_err(api_error)?;
    ok(purchases.into_iter().map(SalesTransactionDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/sales",
    tag = "Sales",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sales of the caller's vehicles", body = ApiResponse<Vec<SalesTransactionDto>>)
    )
)]
pub async fn my_sales(
    State(state): State<SalesHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<SalesTransactionDto>> {
    let sales = state
        .sales_service
        .sales_by_seller(user.user_id)
        .await
        .map_err(api_error)?;
    ok(sales.into_iter().map(SalesTransactionDto::from).collect())
}

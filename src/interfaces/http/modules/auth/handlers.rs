//! Authentication API handlers
//!
//! Thin wrappers over `UserService`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, UserDto};
use crate::application::identity::{Registration, UserService};
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    api_error, bad_request, ok, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let role: UserRole = request
        .role
        .parse()
        .map_err(|_| bad_request("role must be customer or vendor"))?;

    let user = state
        .user_service
        .register(Registration {
            full_name: request.full_name,
            email: request.email,
            password: request.password,
            phone_number: request.phone_number.filter(|p| !p.trim().is_empty()),
            role,
        })
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let auth = state
        .user_service
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            crate::domain::DomainError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Invalid credentials")),
            ),
            other => api_error(other),
        })?;

    ok(LoginResponse {
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
        user: auth.user.into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<UserDto> {
    let user = state
        .user_service
        .get_user(user.user_id)
        .await
        .map_err(api_error)?;
    ok(user.into())
}

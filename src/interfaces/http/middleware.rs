//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InsufficientPermissions,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The bearer token from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
}

/// Verify a raw token into a caller identity.
pub fn authenticate(token: &str, jwt_config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    let claims = verify_token(token, jwt_config).map_err(|e| {
        if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) {
            AuthError::ExpiredToken
        } else {
            AuthError::InvalidToken
        }
    })?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }
    AuthenticatedUser::from_claims(claims).ok_or(AuthError::InvalidToken)
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };
    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match authenticate(token, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

async fn require_role(role: UserRole, request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.role == role => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

/// Layer inside `auth_middleware`.
pub async fn customer_only(request: Request<Body>, next: Next) -> Response {
    require_role(UserRole::Customer, request, next).await
}

pub async fn vendor_only(request: Request<Body>, next: Next) -> Response {
    require_role(UserRole::Vendor, request, next).await
}

pub async fn admin_only(request: Request<Body>, next: Next) -> Response {
    require_role(UserRole::Admin, request, next).await
}

pub fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
    };

    let body = Json(json!({
        "success": false,
        "data": null,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn config() -> JwtConfig {
        JwtConfig::new("middleware-secret", 1)
    }

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.role.to_string()
    }

    fn app() -> Router {
        let state = AuthState { jwt_config: config() };
        let vendor_routes = Router::new()
            .route("/vendor", get(whoami))
            .layer(middleware::from_fn(vendor_only));
        Router::new()
            .route("/any", get(whoami))
            .merge(vendor_routes)
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    async fn call(path: &str, token: Option<&str>) -> StatusCode {
        let mut req = Request::builder().uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn token_extraction() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn guards() {
        let customer =
            create_token(Uuid::new_v4(), "c@example.com", UserRole::Customer, &config()).unwrap();
        let vendor =
            create_token(Uuid::new_v4(), "v@example.com", UserRole::Vendor, &config()).unwrap();

        assert_eq!(call("/any", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(call("/any", Some("garbage")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(call("/any", Some(&customer)).await, StatusCode::OK);
        assert_eq!(call("/vendor", Some(&customer)).await, StatusCode::FORBIDDEN);
        assert_eq!(call("/vendor", Some(&vendor)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn foreign_secret_rejected() {
        let other = JwtConfig::new("another-secret", 1);
        let token = create_token(Uuid::new_v4(), "x@example.com", UserRole::Admin, &other).unwrap();
        assert_eq!(call("/any", Some(&token)).await, StatusCode::UNAUTHORIZED);
    }
}

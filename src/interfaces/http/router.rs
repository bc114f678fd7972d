//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    BookingService, ChatHub, ChatService, PaymentLinks, ReviewService, SalesService, UserService,
    VehicleService,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{
    admin_only, auth_middleware, customer_only, vendor_only, AuthState,
};
use crate::interfaces::http::modules::metrics::http_metrics_middleware;
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    admin, auth, bookings, conversations, health, metrics, payments, reviews, sales, vehicles,
};
use crate::interfaces::ws::{ws_chat_handler, ChatSocketState};
use crate::shared::ShutdownSignal;

/// Everything the HTTP and WebSocket layers need. Each handler module
/// extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
    pub user_service: Arc<UserService>,
    pub vehicle_service: Arc<VehicleService>,
    pub booking_service: Arc<BookingService>,
    pub sales_service: Arc<SalesService>,
    pub review_service: Arc<ReviewService>,
    pub chat_service: Arc<ChatService>,
    pub chat_hub: ChatHub,
    pub shutdown: ShutdownSignal,
    pub prometheus: Option<PrometheusHandle>,
    pub started_at: Arc<Instant>,
}

impl ApiContext {
    /// Wire the services over `repos`. Spawns the chat relay task, so this
    /// must run inside a tokio runtime.
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        payments: PaymentLinks,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(repos.clone(), jwt_config.clone())),
            vehicle_service: Arc::new(VehicleService::new(repos.clone())),
            booking_service: Arc::new(BookingService::new(repos.clone(), payments.clone())),
            sales_service: Arc::new(SalesService::new(repos.clone(), payments)),
            review_service: Arc::new(ReviewService::new(repos.clone())),
            chat_service: Arc::new(ChatService::new(repos.clone())),
            chat_hub: ChatHub::spawn(),
            repos,
            jwt_config,
            shutdown,
            prometheus: None,
            started_at: Arc::new(Instant::now()),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiContext> for AuthState {
    fn from_ref(ctx: &ApiContext) -> Self {
        AuthState {
            jwt_config: ctx.jwt_config.clone(),
        }
    }
}

impl FromRef<ApiContext> for auth::AuthHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        auth::AuthHandlerState {
            user_service: Arc::clone(&ctx.user_service),
        }
    }
}

impl FromRef<ApiContext> for admin::AdminHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        admin::AdminHandlerState {
            user_service: Arc::clone(&ctx.user_service),
            vehicle_service: Arc::clone(&ctx.vehicle_service),
        }
    }
}

impl FromRef<ApiContext> for vehicles::VehicleHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        vehicles::VehicleHandlerState {
            vehicle_service: Arc::clone(&ctx.vehicle_service),
        }
    }
}

impl FromRef<ApiContext> for bookings::BookingHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        bookings::BookingHandlerState {
            booking_service: Arc::clone(&ctx.booking_service),
        }
    }
}

impl FromRef<ApiContext> for payments::PaymentHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        payments::PaymentHandlerState {
            booking_service: Arc::clone(&ctx.booking_service),
            sales_service: Arc::clone(&ctx.sales_service),
        }
    }
}

impl FromRef<ApiContext> for sales::SalesHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        sales::SalesHandlerState {
            sales_service: Arc::clone(&ctx.sales_service),
        }
    }
}

impl FromRef<ApiContext> for reviews::ReviewHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        reviews::ReviewHandlerState {
            review_service: Arc::clone(&ctx.review_service),
        }
    }
}

impl FromRef<ApiContext> for conversations::ConversationHandlerState {
    fn from_ref(ctx: &ApiContext) -> Self {
        conversations::ConversationHandlerState {
            chat_service: Arc::clone(&ctx.chat_service),
        }
    }
}

impl FromRef<ApiContext> for health::HealthState {
    fn from_ref(ctx: &ApiContext) -> Self {
        health::HealthState {
            repos: Arc::clone(&ctx.repos),
            chat_hub: ctx.chat_hub.clone(),
            started_at: Arc::clone(&ctx.started_at),
        }
    }
}

impl FromRef<ApiContext> for metrics::MetricsState {
    fn from_ref(ctx: &ApiContext) -> Self {
        metrics::MetricsState {
            handle: ctx.prometheus.clone(),
        }
    }
}

impl FromRef<ApiContext> for ChatSocketState {
    fn from_ref(ctx: &ApiContext) -> Self {
        ChatSocketState {
            jwt_config: ctx.jwt_config.clone(),
            chat_service: Arc::clone(&ctx.chat_service),
            hub: ctx.chat_hub.clone(),
            shutdown: ctx.shutdown.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::get_current_user,
        // Admin
        admin::list_vendors,
        admin::verify_vendor,
        admin::list_users,
        admin::delete_user,
        admin::list_vehicles,
        admin::delete_vehicle,
        // Vehicles
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        vehicles::my_listings,
        vehicles::create_vehicle,
        vehicles::update_vehicle,
        vehicles::delete_vehicle,
        // Bookings
        bookings::create_booking,
        bookings::my_bookings,
        bookings::vendor_bookings,
        bookings::get_booking,
        bookings::update_booking_status,
        // Payments
        payments::booking_payment_callback,
        payments::sale_payment_callback,
        // Sales
        sales::initiate_purchase,
        sales::my_purchases,
        sales::my_sales,
        // Reviews
        reviews::create_review,
        reviews::vehicle_reviews,
        // Conversations
        conversations::start_conversation,
        conversations::list_conversations,
        conversations::conversation_messages,
    ),
    components(
        schemas(
            ApiResponse<String>,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserDto,
            vehicles::VehicleRequest,
            vehicles::VehicleDto,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingStatusRequest,
            bookings::BookingDto,
            payments::BookingCallbackRequest,
            payments::SaleCallbackRequest,
            payments::CallbackAck,
            sales::SalesTransactionDto,
            reviews::CreateReviewRequest,
            reviews::ReviewDto,
            conversations::ConversationDto,
            conversations::MessageDto,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Registration, login (JWT), current user"),
        (name = "Admin", description = "Vendor verification, account and listing moderation"),
        (name = "Vehicles", description = "Vehicle listings"),
        (name = "Bookings", description = "Rental bookings and their lifecycle"),
        (name = "Payments", description = "Payment collaborator callbacks"),
        (name = "Sales", description = "Vehicle purchases"),
        (name = "Reviews", description = "Reviews of completed rentals"),
        (name = "Conversations", description = "Customer / vendor chat history"),
    ),
    info(
        title = "Vehicle Marketplace API",
        version = "1.0.0",
        description = "Rental and sales marketplace for vehicles"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let authenticated =
        middleware::from_fn_with_state(AuthState::from_ref(&ctx), auth_middleware);

    // Public
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{id}", get(vehicles::get_vehicle))
        .route("/vehicles/{id}/reviews", get(reviews::vehicle_reviews))
        .route("/payments/callback", post(payments::booking_payment_callback))
        .route("/sales/callback", post(payments::sale_payment_callback));

    // Any authenticated user
    let user_routes = Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/{id}/messages",
            get(conversations::conversation_messages),
        );

    let customer_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/my-bookings", get(bookings::my_bookings))
        .route("/bookings/{id}/reviews", post(reviews::create_review))
        .route("/vehicles/{id}/purchase", post(sales::initiate_purchase))
        .route(
            "/vehicles/{id}/conversations",
            post(conversations::start_conversation),
        )
        .route("/sales/purchases", get(sales::my_purchases))
        .layer(middleware::from_fn(customer_only));

    let vendor_routes = Router::new()
        .route("/vehicles", post(vehicles::create_vehicle))
        .route("/vehicles/my-listings", get(vehicles::my_listings))
        .route(
            "/vehicles/{id}",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route("/bookings/vendor", get(bookings::vendor_bookings))
        .route("/bookings/{id}/status", patch(bookings::update_booking_status))
        .route("/sales/sales", get(sales::my_sales))
        .layer(middleware::from_fn(vendor_only));

    let admin_routes = Router::new()
        .route("/admin/vendors", get(admin::list_vendors))
        .route("/admin/vendors/{id}/verify", patch(admin::verify_vendor))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", delete(admin::delete_user))
        .route("/admin/vehicles", get(admin::list_vehicles))
        .route("/admin/vehicles/{id}", delete(admin::delete_vehicle))
        .layer(middleware::from_fn(admin_only));

    // Role guards run after authentication
    let protected_routes = user_routes
        .merge(customer_routes)
        .merge(vendor_routes)
        .merge(admin_routes)
        .layer(authenticated);

    let api_routes = public_routes.merge(protected_routes);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/ws", get(ws_chat_handler))
        .with_state(ctx)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::InMemoryStorage;

    struct TestApp {
        router: Router,
        ctx: ApiContext,
    }

    impl TestApp {
        fn new() -> Self {
            let ctx = ApiContext::new(
                Arc::new(InMemoryStorage::new()),
                JwtConfig::new("router-test-secret", 1),
                PaymentLinks::default(),
                ShutdownSignal::new(),
            );
            Self {
                router: create_api_router(ctx.clone()),
                ctx,
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let req = match body {
                Some(body) => req
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };
            let resp = self.router.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn register_and_login(&self, email: &str, role: &str) -> (String, String) {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/v1/auth/register",
                    None,
                    Some(json!({
                        "full_name": "Test User",
                        "email": email,
                        "password": "password123",
                        "role": role,
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            let id = body["data"]["id"].as_str().unwrap().to_string();
            (self.login(email, "password123").await, id)
        }

        async fn login(&self, email: &str, password: &str) -> String {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/v1/auth/login",
                    None,
                    Some(json!({ "email": email, "password": password })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            body["data"]["token"].as_str().unwrap().to_string()
        }

        /// Verified vendor with one listed vehicle, plus a customer.
        /// Returns (vendor token, customer token, vehicle id).
        async fn marketplace(&self) -> (String, String, String) {
            self.ctx
                .user_service
                .ensure_default_admin("admin@example.com", "admin-password", "Admin")
                .await
                .unwrap();
            let admin = self.login("admin@example.com", "admin-password").await;

            let (vendor, vendor_id) = self.register_and_login("vendor@example.com", "vendor").await;
            let (customer, _) = self
                .register_and_login("customer@example.com", "customer")
                .await;

            let (status, _) = self
                .send(
                    Method::PATCH,
                    &format!("/api/v1/admin/vendors/{}/verify", vendor_id),
                    Some(&admin),
                    None,
                )
                .await;
            assert_eq!(status, StatusCode::OK);

            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/v1/vehicles",
                    Some(&vendor),
                    Some(vehicle_body()),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();
            (vendor, customer, vehicle_id)
        }
    }

    fn vehicle_body() -> Value {
        json!({
            "brand": "Honda",
            "model": "Brio",
            "year": 2022,
            "plate_number": "DT 1234 AB",
            "vehicle_type": "mobil",
            "transmission": "matic",
            "fuel": "bensin",
            "is_for_sale": true,
            "sale_price": 160000000,
            "is_for_rent": true,
            "rental_price_daily": 100000
        })
    }

    #[tokio::test]
    async fn health_and_docs_are_public() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "ok");

        let (status, body) = app
            .send(Method::GET, "/api-docs/openapi.json", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/bookings"].is_object());
    }

    #[tokio::test]
    async fn admin_moderates_accounts_and_listings() {
        let app = TestApp::new();
        let (_, customer, vehicle_id) = app.marketplace().await;
        let admin = app.login("admin@example.com", "admin-password").await;

        let (status, _) = app
            .send(Method::GET, "/api/v1/admin/users", Some(&customer), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(Method::GET, "/api/v1/admin/vendors", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["email"], "vendor@example.com");

        let (status, body) = app
            .send(Method::GET, "/api/v1/admin/users", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 3);
        let find = |email: &str| {
            users
                .iter()
                .find(|u| u["email"] == email)
                .and_then(|u| u["id"].as_str())
                .unwrap()
                .to_string()
        };
        let customer_id = find("customer@example.com");
        let admin_id = find("admin@example.com");

        let (status, body) = app
            .send(Method::GET, "/api/v1/admin/vehicles", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/api/v1/admin/vehicles/{}", vehicle_id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .send(Method::GET, &format!("/api/v1/vehicles/{}", vehicle_id), None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/api/v1/admin/users/{}", admin_id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/api/v1/admin/users/{}", customer_id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app
            .send(Method::GET, "/api/v1/admin/users", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn guards_reject_missing_token_and_wrong_role() {
        let app = TestApp::new();
        let (_, customer, _) = app.marketplace().await;

        let (status, _) = app
            .send(Method::GET, "/api/v1/bookings/my-bookings", None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .send(Method::POST, "/api/v1/vehicles", Some(&customer), Some(vehicle_body()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unverified_vendor_cannot_list() {
        let app = TestApp::new();
        let (vendor, _) = app.register_and_login("fresh@example.com", "vendor").await;
        let (status, _) = app
            .send(Method::POST, "/api/v1/vehicles", Some(&vendor), Some(vehicle_body()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rental_round_trip() {
        let app = TestApp::new();
        let (vendor, customer, vehicle_id) = app.marketplace().await;

        // Public catalog
        let (status, body) = app.send(Method::GET, "/api/v1/vehicles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-03-01",
                    "end_date": "2024-03-03"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["total_price"], 300000);
        assert_eq!(body["data"]["status"], "pending_payment");
        let booking_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/payments/callback",
                None,
                Some(json!({ "booking_id": booking_id, "status": "success" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "confirmed");

        // Confirmed dates now block
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-03-03",
                    "end_date": "2024-03-04"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let status_uri = format!("/api/v1/bookings/{}/status", booking_id);
        for next in ["rented_out", "completed"] {
            let (status, body) = app
                .send(Method::PATCH, &status_uri, Some(&vendor), Some(json!({ "status": next })))
                .await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            assert_eq!(body["data"]["status"], next);
        }

        // Terminal
        let (status, _) = app
            .send(Method::PATCH, &status_uri, Some(&vendor), Some(json!({ "status": "cancelled" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/v1/bookings/{}/reviews", booking_id),
                Some(&customer),
                Some(json!({ "rating": 5, "comment": "Mantap" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/v1/vehicles/{}/reviews", vehicle_id),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["rating"], 5);

        let (status, body) = app
            .send(Method::GET, "/api/v1/bookings/vendor", Some(&vendor), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn booking_visible_to_renter_and_owner_only() {
        let app = TestApp::new();
        let (vendor, customer, vehicle_id) = app.marketplace().await;
        let (stranger, _) = app
            .register_and_login("stranger@example.com", "customer")
            .await;

        let (_, body) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-01-10",
                    "end_date": "2024-01-15"
                })),
            )
            .await;
        let uri = format!("/api/v1/bookings/{}", body["data"]["id"].as_str().unwrap());

        assert_eq!(app.send(Method::GET, &uri, Some(&customer), None).await.0, StatusCode::OK);
        assert_eq!(app.send(Method::GET, &uri, Some(&vendor), None).await.0, StatusCode::OK);
        assert_eq!(
            app.send(Method::GET, &uri, Some(&stranger), None).await.0,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn invalid_requests() {
        let app = TestApp::new();
        let (vendor, customer, vehicle_id) = app.marketplace().await;

        // end before start
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-03-05",
                    "end_date": "2024-03-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-03-01",
                    "end_date": "2024-03-01"
                })),
            )
            .await;
        assert_eq!(body["data"]["total_price"], 100000);
        let booking_id = body["data"]["id"].as_str().unwrap().to_string();

        // Owners may not pick statuses outside their set
        let (status, _) = app
            .send(
                Method::PATCH,
                &format!("/api/v1/bookings/{}/status", booking_id),
                Some(&vendor),
                Some(json!({ "status": "confirmed" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Pending bookings cannot be rented out
        let (status, _) = app
            .send(
                Method::PATCH,
                &format!("/api/v1/bookings/{}/status", booking_id),
                Some(&vendor),
                Some(json!({ "status": "rented_out" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn payment_callback_contract() {
        let app = TestApp::new();
        let (_, customer, vehicle_id) = app.marketplace().await;
        let (_, body) = app
            .send(
                Method::POST,
                "/api/v1/bookings",
                Some(&customer),
                Some(json!({
                    "vehicle_id": vehicle_id,
                    "start_date": "2024-04-01",
                    "end_date": "2024-04-02"
                })),
            )
            .await;
        let booking_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/payments/callback",
                None,
                Some(json!({ "booking_id": booking_id, "status": "failed" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], "ignored");

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/payments/callback",
                None,
                Some(json!({ "booking_id": "not-a-uuid", "status": "success" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/payments/callback",
                None,
                Some(json!({ "status": "success" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/payments/callback",
                None,
                Some(json!({ "booking_id": uuid::Uuid::new_v4(), "status": "success" })),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // Duplicate success callbacks are no-ops
        for _ in 0..2 {
            let (status, body) = app
                .send(
                    Method::POST,
                    "/api/v1/payments/callback",
                    None,
                    Some(json!({ "booking_id": booking_id, "status": "success" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["status"], "confirmed");
        }
    }

    #[tokio::test]
    async fn purchase_retires_vehicle() {
        let app = TestApp::new();
        let (vendor, customer, vehicle_id) = app.marketplace().await;

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/v1/vehicles/{}/purchase", vehicle_id),
                Some(&customer),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["agreed_price"], 160000000);
        let transaction_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/sales/callback",
                None,
                Some(json!({ "transaction_id": transaction_id, "status": "success" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "completed");

        let (_, body) = app
            .send(Method::GET, &format!("/api/v1/vehicles/{}", vehicle_id), None, None)
            .await;
        assert_eq!(body["data"]["status"], "sold");
        assert_eq!(body["data"]["is_for_rent"], false);

        let (_, body) = app.send(Method::GET, "/api/v1/vehicles", None, None).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (_, body) = app
            .send(Method::GET, "/api/v1/sales/sales", Some(&vendor), None)
            .await;
        assert_eq!(body["data"][0]["status"], "completed");

        let (status, _) = app
            .send(
                Method::PUT,
                &format!("/api/v1/vehicles/{}", vehicle_id),
                Some(&vendor),
                Some(vehicle_body()),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn conversation_history() {
        let app = TestApp::new();
        let (vendor, customer, vehicle_id) = app.marketplace().await;

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/v1/vehicles/{}/conversations", vehicle_id),
                Some(&customer),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let conversation_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = app
            .send(Method::GET, "/api/v1/conversations", Some(&vendor), None)
            .await;
        assert_eq!(body["data"][0]["id"], conversation_id.as_str());

        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/v1/conversations/{}/messages", conversation_id),
                Some(&vendor),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ws_requires_token() {
        let app = TestApp::new();
        let (status, _) = app.send(Method::GET, "/ws", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

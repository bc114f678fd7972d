//! Metric names shared by the services and the HTTP layer.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// ── HTTP ────────────────────────────────────────────────────────

/// Counter: HTTP requests. Labels: method, path, status.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Histogram: HTTP request latency in seconds. Labels: method, path.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

// ── Lifecycle engines ───────────────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "marketplace_bookings_created_total";

/// Counter: booking requests refused because the dates were taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "marketplace_booking_conflicts_total";

/// Counter: owner-driven booking transitions. Labels: to.
pub const BOOKING_TRANSITIONS_TOTAL: &str = "marketplace_booking_transitions_total";

/// Counter: payment callbacks received. Labels: kind (booking|sale), outcome.
pub const PAYMENT_CALLBACKS_TOTAL: &str = "marketplace_payment_callbacks_total";

/// Counter: purchases initiated.
pub const SALES_INITIATED_TOTAL: &str = "marketplace_sales_initiated_total";

/// Counter: sales completed (vehicle retired).
pub const SALES_COMPLETED_TOTAL: &str = "marketplace_sales_completed_total";

/// Counter: completed sales whose vehicle had to be retired again.
pub const SALE_RECONCILIATIONS_TOTAL: &str = "marketplace_sale_reconciliations_total";

// ── Chat ────────────────────────────────────────────────────────

/// Gauge: live chat sockets.
pub const CHAT_CONNECTIONS_ACTIVE: &str = "marketplace_chat_connections_active";

/// Counter: chat messages stored. Labels: delivered (true|false).
pub const CHAT_MESSAGES_TOTAL: &str = "marketplace_chat_messages_total";

/// Install the Prometheus recorder; must run before any metric is touched.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

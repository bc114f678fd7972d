//! Vehicle marketplace service
//!
//! REST API, payment callbacks and the chat WebSocket on a single port.
//! Reads configuration from a TOML file (~/.config/vehicle-marketplace/config.toml,
//! overridable with MARKETPLACE_CONFIG).

use tracing::{error, info};

use vehicle_marketplace::{config_path, init_tracing, AppConfig, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let path = config_path();
    let (app_cfg, load_error) = match AppConfig::load(&path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&app_cfg);
    match load_error {
        None => info!("Configuration loaded from {}", path.display()),
        Some(e) => error!(
            "Failed to load config from {}: {}. Using defaults.",
            path.display(),
            e
        ),
    }

    let handle = match ServerHandle::start(ServerOptions {
        config: app_cfg,
        ..Default::default()
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e);
        }
    };

    // Start listening for shutdown signals (SIGTERM, SIGINT)
    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}

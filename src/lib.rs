//! # Vehicle Marketplace
//!
//! Backend for a two-sided vehicle marketplace: vendors list cars and
//! motorcycles for rent or sale, customers book rentals, buy vehicles,
//! review completed rentals and chat with owners.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, lifecycle rules and repository traits
//! - **application**: Availability oracle, booking / sales engines, identity, chat
//! - **infrastructure**: SeaORM persistence, in-memory storage, JWT and bcrypt
//! - **interfaces**: REST API with Swagger documentation and the chat WebSocket
//! - **server**: Process bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod observability;
pub mod server;
pub mod shared;

pub use config::{config_path, default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryStorage, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::{create_api_router, ApiContext};

pub use server::{init_tracing, ServerHandle, ServerOptions};

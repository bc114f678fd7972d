//! Payment collaborator webhooks
//!
//! Public endpoints. Only the `success` status changes state; anything
//! else is acknowledged and ignored.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

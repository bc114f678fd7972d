//! Conversations between customers and vendors, plus live relay

pub mod hub;
pub mod service;

pub use hub::{ChatHub, ConnectionHandle};
pub use service::ChatService;

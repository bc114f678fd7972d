//! Identity module: registration, login and vendor verification

pub mod service;

pub use service::{AuthResult, Registration, UserService};

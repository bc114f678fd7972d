pub mod chat;
pub mod identity;
pub mod payments;
pub mod services;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export key types for convenience
pub use chat::{ChatHub, ChatService};
pub use identity::{AuthResult, Registration, UserService};
pub use payments::{PaymentLink, PaymentLinks, PaymentOutcome};
pub use services::{AvailabilityOracle, BookingService, ReviewService, SalesService, VehicleService};

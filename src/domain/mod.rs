pub mod booking;
pub mod chat;
pub mod repositories;
pub mod review;
pub mod sale;
pub mod user;
pub mod vehicle;

// Re-export commonly used types
pub use booking::{Booking, BookingRepository, BookingStatus, DateRange};
pub use chat::{ChatRepository, Conversation, Message};
pub use repositories::{DomainResult, RepositoryProvider};
pub use review::{Review, ReviewRepository};
pub use sale::{SaleStatus, SalesRepository, SalesTransaction};
pub use user::{User, UserRepository, UserRole};
pub use vehicle::{Vehicle, VehicleListing, VehicleRepository, VehicleStatus};

pub use crate::shared::errors::DomainError;

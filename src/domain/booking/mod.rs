//! Booking aggregate

pub mod model;
pub mod repository;

pub use model::{Booking, BookingStatus, DateRange};
pub use repository::BookingRepository;

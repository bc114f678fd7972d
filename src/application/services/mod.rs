//! Application services

mod availability;
mod booking;
mod review;
mod sales;
mod vehicle;

pub use availability::AvailabilityOracle;
pub use booking::BookingService;
pub use review::ReviewService;
pub use sales::SalesService;
pub use vehicle::VehicleService;

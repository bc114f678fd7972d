pub mod admin;
pub mod auth;
pub mod bookings;
pub mod conversations;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod request_id;
pub mod reviews;
pub mod sales;
pub mod vehicles;

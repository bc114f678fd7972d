//! Vehicle aggregate

pub mod model;
pub mod repository;

pub use model::{FuelType, Transmission, Vehicle, VehicleListing, VehicleStatus, VehicleType};
pub use repository::VehicleRepository;

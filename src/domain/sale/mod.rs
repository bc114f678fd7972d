//! Sales transaction aggregate

pub mod model;
pub mod repository;

pub use model::{SaleStatus, SalesTransaction};
pub use repository::SalesRepository;

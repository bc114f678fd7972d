//! Vehicle listings: public catalog plus vendor management

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

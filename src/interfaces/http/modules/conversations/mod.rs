//! Chat history over REST; live delivery is on `/ws`

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

//! Chat aggregate: conversations and their messages

pub mod model;
pub mod repository;

pub use model::{Conversation, Message, MAX_MESSAGE_LENGTH};
pub use repository::ChatRepository;

//! WebSocket interfaces
//!
//! - `chat`: live customer/vendor chat relay

pub mod chat;

pub use chat::{ws_chat_handler, ChatSocketState};

//! Conversation and message entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::shared::errors::DomainError;

pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// A thread between a customer and a vehicle's owner about one vehicle.
/// Unique per (customer, vendor, vehicle).
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub vehicle_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Bumped on every new message
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(customer_id: Uuid, vendor_id: Uuid, vehicle_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            vendor_id,
            vehicle_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.vendor_id == user_id
    }

    /// The other side of the conversation, if `user_id` takes part in it.
    pub fn counterpart(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.customer_id {
            Some(self.vendor_id)
        } else if user_id == self.vendor_id {
            Some(self.customer_id)
        } else {
            None
        }
    }
}

/// Serialized as-is to the recipient's live socket.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> Result<Self, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation("message content is empty".into()));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::Validation(format!(
                "message content exceeds {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            recipient_id,
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        })
    }
}

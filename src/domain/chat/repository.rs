use async_trait::async_trait;
use uuid::Uuid;

use super::{Conversation, Message};
use crate::domain::DomainResult;

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Return the conversation for the triple, creating it on first use.
    async fn find_or_create_conversation(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        vehicle_id: Uuid,
    ) -> DomainResult<Conversation>;

    async fn find_conversation(&self, id: Uuid) -> DomainResult<Option<Conversation>>;

    /// Conversations the user takes part in, most recently active first
    async fn find_conversations_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Conversation>>;

    /// Store the message and bump its conversation's `updated_at`.
    async fn save_message(&self, message: &Message) -> DomainResult<Message>;

    /// Oldest first
    async fn find_messages(&self, conversation_id: Uuid) -> DomainResult<Vec<Message>>;
}

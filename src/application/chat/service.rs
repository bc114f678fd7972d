//! Chat service: conversation lookup, participation checks, persistence

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Conversation, DomainError, DomainResult, Message, RepositoryProvider};

pub struct ChatService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ChatService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn load_conversation(&self, conversation_id: Uuid) -> DomainResult<Conversation> {
        self.repos
            .chat()
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Conversation", conversation_id))
    }

    /// Find or open the conversation between a customer and the owner of
    /// `vehicle_id`.
    pub async fn start_conversation(
        &self,
        customer_id: Uuid,
        vehicle_id: Uuid,
    ) -> DomainResult<Conversation> {
        let vehicle = self
            .repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))?;

        if vehicle.is_owned_by(customer_id) {
            return Err(DomainError::Validation(
                "cannot start a conversation with yourself".into(),
            ));
        }

        self.repos
            .chat()
            .find_or_create_conversation(customer_id, vehicle.owner_id, vehicle_id)
            .await
    }

    pub async fn conversations_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Conversation>> {
        self.repos.chat().find_conversations_for_user(user_id).await
    }

    /// Message history, oldest first. Participants only.
    pub async fn messages_for_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Vec<Message>> {
        let conversation = self.load_conversation(conversation_id).await?;
        if !conversation.is_participant(user_id) {
            return Err(DomainError::Forbidden(
                "not a participant of this conversation".into(),
            ));
        }
        self.repos.chat().find_messages(conversation_id).await
    }

    /// Validate and store a message from `sender_id`. The recipient must be
    /// the other participant.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> DomainResult<Message> {
        let conversation = self.load_conversation(conversation_id).await?;
        let Some(counterpart) = conversation.counterpart(sender_id) else {
            return Err(DomainError::Forbidden(
                "not a participant of this conversation".into(),
            ));
        };
        if counterpart != recipient_id {
            return Err(DomainError::Validation(
                "recipient is not part of this conversation".into(),
            ));
        }

        let message = Message::new(conversation_id, sender_id, recipient_id, content)?;
        let message = self.repos.chat().save_message(&message).await?;
        debug!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            "Message stored"
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::domain::UserRole;

    #[tokio::test]
    async fn start_is_find_or_create() {
        let world = fixtures::world().await;
        let svc = ChatService::new(world.provider());

        let first = svc
            .start_conversation(world.customer.id, world.vehicle.id)
            .await
            .unwrap();
        let again = svc
            .start_conversation(world.customer.id, world.vehicle.id)
            .await
            .unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.vendor_id, world.vendor.id);

        assert!(matches!(
            svc.start_conversation(world.vendor.id, world.vehicle.id).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.start_conversation(world.customer.id, Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn send_and_read_history() {
        let world = fixtures::world().await;
        let svc = ChatService::new(world.provider());
        let convo = svc
            .start_conversation(world.customer.id, world.vehicle.id)
            .await
            .unwrap();

        svc.send_message(world.customer.id, convo.id, world.vendor.id, "Masih ada?")
            .await
            .unwrap();
        svc.send_message(world.vendor.id, convo.id, world.customer.id, "Masih")
            .await
            .unwrap();

        let history = svc
            .messages_for_conversation(convo.id, world.vendor.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "Masih ada?");
        assert_eq!(history[1].sender_id, world.vendor.id);

        let listed = svc.conversations_for_user(world.vendor.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn outsiders_are_rejected() {
        let world = fixtures::world().await;
        let svc = ChatService::new(world.provider());
        let outsider = fixtures::user(&world.repos, UserRole::Customer).await;
        let convo = svc
            .start_conversation(world.customer.id, world.vehicle.id)
            .await
            .unwrap();

        assert!(matches!(
            svc.send_message(outsider.id, convo.id, world.vendor.id, "hi").await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.send_message(world.customer.id, convo.id, outsider.id, "hi").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.messages_for_conversation(convo.id, outsider.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.send_message(world.customer.id, convo.id, world.vendor.id, "   ").await,
            Err(DomainError::Validation(_))
        ));
    }
}

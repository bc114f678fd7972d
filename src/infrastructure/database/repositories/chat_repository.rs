//! SeaORM implementation of ChatRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::{ChatRepository, Conversation, DomainError, DomainResult, Message};
use crate::infrastructure::database::entities::{conversation, message};
use crate::shared::next_timestamp;

pub struct SeaOrmChatRepository {
    db: DatabaseConnection,
}

impl SeaOrmChatRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_participants(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        vehicle_id: Uuid,
    ) -> DomainResult<Option<Conversation>> {
        let model = conversation::Entity::find()
            .filter(conversation::Column::CustomerId.eq(customer_id))
            .filter(conversation::Column::VendorId.eq(vendor_id))
            .filter(conversation::Column::VehicleId.eq(vehicle_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(conversation_to_domain))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn conversation_to_domain(m: conversation::Model) -> Conversation {
    Conversation {
        id: m.id,
        customer_id: m.customer_id,
        vendor_id: m.vendor_id,
        vehicle_id: m.vehicle_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn message_to_domain(m: message::Model) -> Message {
    Message {
        id: m.id,
        conversation_id: m.conversation_id,
        sender_id: m.sender_id,
        recipient_id: m.recipient_id,
        content: m.content,
        is_read: m.is_read,
        created_at: m.created_at,
    }
}

// ── ChatRepository impl ─────────────────────────────────────────

#[async_trait]
impl ChatRepository for SeaOrmChatRepository {
    async fn find_or_create_conversation(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        vehicle_id: Uuid,
    ) -> DomainResult<Conversation> {
        if let Some(existing) = self
            .find_by_participants(customer_id, vendor_id, vehicle_id)
            .await?
        {
            return Ok(existing);
        }

        let c = Conversation::new(customer_id, vendor_id, vehicle_id);
        let model = conversation::ActiveModel {
            id: Set(c.id),
            customer_id: Set(c.customer_id),
            vendor_id: Set(c.vendor_id),
            vehicle_id: Set(c.vehicle_id),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
        };

        match model.insert(&self.db).await {
            Ok(inserted) => {
                debug!("Created conversation {} for vehicle {}", c.id, vehicle_id);
                Ok(conversation_to_domain(inserted))
            }
            // Lost a race with a concurrent first message: use the winner's row.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_participants(customer_id, vendor_id, vehicle_id)
                .await?
                .ok_or_else(|| db_err(e)),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_conversation(&self, id: Uuid) -> DomainResult<Option<Conversation>> {
        let model = conversation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(conversation_to_domain))
    }

    async fn find_conversations_for_user(
        &self,
        user_id: Uuid,
    ) -> DomainResult<Vec<Conversation>> {
        let models = conversation::Entity::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::CustomerId.eq(user_id))
                    .add(conversation::Column::VendorId.eq(user_id)),
            )
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(conversation_to_domain).collect())
    }

    async fn save_message(&self, m: &Message) -> DomainResult<Message> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let current = conversation::Entity::find_by_id(m.conversation_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Conversation", m.conversation_id))?;

        let model = message::ActiveModel {
            id: Set(m.id),
            conversation_id: Set(m.conversation_id),
            sender_id: Set(m.sender_id),
            recipient_id: Set(m.recipient_id),
            content: Set(m.content.clone()),
            is_read: Set(m.is_read),
            created_at: Set(m.created_at),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        conversation::Entity::update_many()
            .col_expr(
                conversation::Column::UpdatedAt,
                Expr::value(next_timestamp(current.updated_at)),
            )
            .filter(conversation::Column::Id.eq(m.conversation_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(message_to_domain(inserted))
    }

    async fn find_messages(&self, conversation_id: Uuid) -> DomainResult<Vec<Message>> {
        let models = message::Entity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(message_to_domain).collect())
    }
}

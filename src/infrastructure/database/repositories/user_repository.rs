//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, insert_err};
use crate::domain::{DomainResult, User, UserRepository, UserRole};
use crate::infrastructure::database::entities::{
    booking, conversation, message, review, sales_transaction, user, vehicle,
};
use crate::shared::next_timestamp;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Customer => UserRole::Customer,
        user::UserRole::Vendor => UserRole::Vendor,
        user::UserRole::Admin => UserRole::Admin,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Customer => user::UserRole::Customer,
        UserRole::Vendor => user::UserRole::Vendor,
        UserRole::Admin => user::UserRole::Admin,
    }
}

fn model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        phone_number: model.phone_number,
        role: entity_role_to_domain(model.role),
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── UserRepository impl ─────────────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn save(&self, u: &User) -> DomainResult<User> {
        debug!("Saving user: {} ({})", u.id, u.role);

        let model = user::ActiveModel {
            id: Set(u.id),
            full_name: Set(u.full_name.clone()),
            email: Set(u.email.clone()),
            password_hash: Set(u.password_hash.clone()),
            phone_number: Set(u.phone_number.clone()),
            role: Set(domain_role_to_entity(u.role)),
            is_verified: Set(u.is_verified),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| insert_err(e, &format!("email {} is already registered", u.email)))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn mark_verified(&self, id: Uuid) -> DomainResult<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let updated_at = next_timestamp(existing.updated_at);
        let mut active: user::ActiveModel = existing.into();
        active.is_verified = Set(true);
        active.updated_at = Set(updated_at);
        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_role(&self, role: UserRole) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::Role.eq(domain_role_to_entity(role)))
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        debug!("Deleting user {} and dependent records", id);

        let txn = self.db.begin().await.map_err(db_err)?;

        let owned: Vec<Uuid> = vehicle::Entity::find()
            .select_only()
            .column(vehicle::Column::Id)
            .filter(vehicle::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let conversations: Vec<Uuid> = conversation::Entity::find()
            .select_only()
            .column(conversation::Column::Id)
            .filter(
                Condition::any()
                    .add(conversation::Column::CustomerId.eq(id))
                    .add(conversation::Column::VendorId.eq(id))
                    .add(conversation::Column::VehicleId.is_in(owned.clone())),
            )
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;
        message::Entity::delete_many()
            .filter(message::Column::ConversationId.is_in(conversations.clone()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        conversation::Entity::delete_many()
            .filter(conversation::Column::Id.is_in(conversations))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let bookings: Vec<Uuid> = booking::Entity::find()
            .select_only()
            .column(booking::Column::Id)
            .filter(
                Condition::any()
                    .add(booking::Column::UserId.eq(id))
                    .add(booking::Column::VehicleId.is_in(owned.clone())),
            )
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;
        review::Entity::delete_many()
            .filter(review::Column::BookingId.is_in(bookings.clone()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        booking::Entity::delete_many()
            .filter(booking::Column::Id.is_in(bookings))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        sales_transaction::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(sales_transaction::Column::BuyerId.eq(id))
                    .add(sales_transaction::Column::SellerId.eq(id))
                    .add(sales_transaction::Column::VehicleId.is_in(owned.clone())),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        vehicle::Entity::delete_many()
            .filter(vehicle::Column::Id.is_in(owned))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = user::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

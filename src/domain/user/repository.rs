use async_trait::async_trait;
use uuid::Uuid;

use super::{User, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the email is taken.
    async fn save(&self, user: &User) -> DomainResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Mark a user as verified; `None` when the user does not exist.
    async fn mark_verified(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn count(&self) -> DomainResult<u64>;

    /// Newest first
    async fn find_all(&self) -> DomainResult<Vec<User>>;

    async fn find_by_role(&self, role: UserRole) -> DomainResult<Vec<User>>;

    /// Removes the user together with everything they own or took part
    /// in. Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
}

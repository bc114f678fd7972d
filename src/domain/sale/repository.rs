use async_trait::async_trait;
use uuid::Uuid;

use super::SalesTransaction;
use crate::domain::DomainResult;

#[async_trait]
pub trait SalesRepository: Send + Sync {
    async fn save(&self, transaction: &SalesTransaction) -> DomainResult<SalesTransaction>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<SalesTransaction>>;

    async fn find_by_buyer(&self, buyer_id: Uuid) -> DomainResult<Vec<SalesTransaction>>;

    async fn find_by_seller(&self, seller_id: Uuid) -> DomainResult<Vec<SalesTransaction>>;

    /// In one unit of work: move the transaction from `payment_pending`
    /// to `completed` and retire its vehicle. Nothing is written when
    /// either step fails. `Conflict` when the transaction is no longer
    /// pending.
    async fn complete_and_retire(&self, id: Uuid) -> DomainResult<SalesTransaction>;

    async fn has_pending_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool>;
}

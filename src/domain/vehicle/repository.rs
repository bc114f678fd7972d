use async_trait::async_trait;
use uuid::Uuid;

use super::Vehicle;
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn save(&self, vehicle: &Vehicle) -> DomainResult<Vehicle>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>>;

    /// Persist the listing attributes of an available vehicle. Status
    /// and ownership are never written here. The store stamps
    /// `updated_at`; `NotFound` when the vehicle is gone, `Conflict` when
    /// it has been sold.
    async fn update(&self, vehicle: &Vehicle) -> DomainResult<Vehicle>;

    /// Mark a vehicle sold and withdraw it from both markets; `None`
    /// when the vehicle does not exist.
    async fn retire(&self, id: Uuid) -> DomainResult<Option<Vehicle>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Vehicles with status `available`, newest first
    async fn find_available(&self) -> DomainResult<Vec<Vehicle>>;

    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Vehicle>>;

    /// Every vehicle regardless of status, newest first
    async fn find_all(&self) -> DomainResult<Vec<Vehicle>>;
}

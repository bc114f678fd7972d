//! Vehicle listing management

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, RepositoryProvider, Vehicle, VehicleListing};

pub struct VehicleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl VehicleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Load a vehicle the requester owns.
    async fn owned(&self, vehicle_id: Uuid, requester_id: Uuid) -> DomainResult<Vehicle> {
        let vehicle = self.get(vehicle_id).await?;
        if !vehicle.is_owned_by(requester_id) {
            return Err(DomainError::Forbidden("not the owner of this vehicle".into()));
        }
        Ok(vehicle)
    }

    /// List a new vehicle. Only verified vendors may list.
    pub async fn create(&self, owner_id: Uuid, listing: VehicleListing) -> DomainResult<Vehicle> {
        let owner = self
            .repos
            .users()
            .find_by_id(owner_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("unknown account".into()))?;
        if !owner.can_list_vehicles() {
            return Err(DomainError::Forbidden(
                "only verified vendors can list vehicles".into(),
            ));
        }
        listing.validate()?;

        let vehicle = self
            .repos
            .vehicles()
            .save(&Vehicle::new(owner_id, listing))
            .await?;
        info!(
            vehicle_id = %vehicle.id,
            owner_id = %owner_id,
            plate_number = %vehicle.plate_number,
            "Vehicle listed"
        );
        Ok(vehicle)
    }

    pub async fn get(&self, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))
    }

    pub async fn list_available(&self) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_available().await
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_by_owner(owner_id).await
    }

    /// Replace the listing attributes. Sold vehicles are frozen.
    pub async fn update(
        &self,
        vehicle_id: Uuid,
        requester_id: Uuid,
        listing: VehicleListing,
    ) -> DomainResult<Vehicle> {
        let mut vehicle = self.owned(vehicle_id, requester_id).await?;
        if vehicle.is_retired() {
            return Err(DomainError::Conflict("sold vehicles cannot be edited".into()));
        }
        listing.validate()?;

        vehicle.apply_listing(listing);
        let vehicle = self.repos.vehicles().update(&vehicle).await?;
        info!(vehicle_id = %vehicle_id, "Vehicle listing updated");
        Ok(vehicle)
    }

    /// Remove a listing that no open booking or pending sale refers to.
    pub async fn delete(&self, vehicle_id: Uuid, requester_id: Uuid) -> DomainResult<()> {
        self.owned(vehicle_id, requester_id).await?;
        self.remove(vehicle_id).await
    }

    // ── Administration ──────────────────────────────────────────

    /// Every listing, sold ones included.
    pub async fn list_all(&self) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_all().await
    }

    /// Take down any listing. The open booking and pending sale guards
    /// still apply.
    pub async fn delete_any(&self, vehicle_id: Uuid) -> DomainResult<()> {
        self.get(vehicle_id).await?;
        self.remove(vehicle_id).await
    }

    async fn remove(&self, vehicle_id: Uuid) -> DomainResult<()> {
        if self.repos.bookings().has_open_for_vehicle(vehicle_id).await? {
            return Err(DomainError::Conflict(
                "vehicle has bookings in progress".into(),
            ));
        }
        if self.repos.sales().has_pending_for_vehicle(vehicle_id).await? {
            return Err(DomainError::Conflict("vehicle has a pending sale".into()));
        }

        if !self.repos.vehicles().delete(vehicle_id).await? {
            return Err(DomainError::not_found("Vehicle", vehicle_id));
        }
        info!(vehicle_id = %vehicle_id, "Vehicle deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::{self, World};
    use crate::domain::vehicle::model::tests::listing;
    use crate::domain::{Booking, DateRange, UserRole, VehicleStatus};

    fn service(world: &World) -> VehicleService {
        VehicleService::new(world.provider())
    }

    #[tokio::test]
    async fn verified_vendor_lists_vehicle() {
        let world = fixtures::world().await;
        let vehicle = service(&world).create(world.vendor.id, listing()).await.unwrap();
        assert_eq!(vehicle.owner_id, world.vendor.id);
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn unverified_vendor_and_customer_cannot_list() {
        let world = fixtures::world().await;
        let svc = service(&world);

        let unverified = crate::domain::User::new(
            "Pending Vendor",
            "pending@example.com",
            "hash",
            None,
            UserRole::Vendor,
        );
        world.repos.users().save(&unverified).await.unwrap();

        assert!(matches!(
            svc.create(unverified.id, listing()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.create(world.customer.id, listing()).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn invalid_listing_rejected() {
        let world = fixtures::world().await;
        let mut bad = listing();
        bad.is_for_sale = true;
        bad.sale_price = None;
        assert!(matches!(
            service(&world).create(world.vendor.id, bad).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn only_owner_updates_and_sold_is_frozen() {
        let world = fixtures::world().await;
        let svc = service(&world);

        let mut changed = listing();
        changed.color = Some("red".into());
        assert!(matches!(
            svc.update(world.vehicle.id, world.customer.id, changed.clone()).await,
            Err(DomainError::Forbidden(_))
        ));

        let updated = svc
            .update(world.vehicle.id, world.vendor.id, changed.clone())
            .await
            .unwrap();
        assert_eq!(updated.color.as_deref(), Some("red"));

        world.repos.vehicles().retire(world.vehicle.id).await.unwrap().unwrap();
        assert!(matches!(
            svc.update(world.vehicle.id, world.vendor.id, changed).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn stale_edit_cannot_reopen_sold_vehicle() {
        let world = fixtures::world().await;

        // Loaded before the sale completed
        let mut stale = world.vehicle.clone();
        stale.color = Some("blue".into());
        world.repos.vehicles().retire(world.vehicle.id).await.unwrap().unwrap();

        assert!(matches!(
            world.repos.vehicles().update(&stale).await,
            Err(DomainError::Conflict(_))
        ));
        let stored = world.repos.vehicles().find_by_id(world.vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VehicleStatus::Sold);
        assert!(!stored.is_for_sale && !stored.is_for_rent);
        assert_ne!(stored.color.as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn update_leaves_status_alone() {
        let world = fixtures::world().await;
        let mut forged = world.vehicle.clone();
        forged.status = VehicleStatus::Sold;
        forged.owner_id = world.customer.id;
        forged.rental_price_daily = Some(90_000);

        let stored = world.repos.vehicles().update(&forged).await.unwrap();
        assert_eq!(stored.status, VehicleStatus::Available);
        assert_eq!(stored.owner_id, world.vendor.id);
        assert_eq!(stored.rental_price_daily, Some(90_000));
    }

    #[tokio::test]
    async fn admin_lists_everything_and_deletes_any_free_listing() {
        let world = fixtures::world().await;
        let svc = service(&world);
        let sold = fixtures::vehicle(&world.repos, world.vendor.id).await;
        world.repos.vehicles().retire(sold.id).await.unwrap();

        assert_eq!(svc.list_all().await.unwrap().len(), 2);
        assert_eq!(svc.list_available().await.unwrap().len(), 1);

        let range = DateRange::parse("2024-06-01", "2024-06-03").unwrap();
        let booking = Booking::pending(
            Uuid::new_v4(),
            world.customer.id,
            world.vehicle.id,
            range,
            300_000,
            "BOOK-y",
            "https://pay.example/y",
        );
        world.repos.bookings().create_if_available(&booking).await.unwrap();
        assert!(matches!(
            svc.delete_any(world.vehicle.id).await,
            Err(DomainError::Conflict(_))
        ));

        svc.delete_any(sold.id).await.unwrap();
        assert!(matches!(
            svc.delete_any(sold.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(svc.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_refused_while_booking_open() {
        let world = fixtures::world().await;
        let svc = service(&world);

        let range = DateRange::parse("2024-05-01", "2024-05-02").unwrap();
        let booking = Booking::pending(
            Uuid::new_v4(),
            world.customer.id,
            world.vehicle.id,
            range,
            200_000,
            "BOOK-x",
            "https://pay.example/x",
        );
        world.repos.bookings().create_if_available(&booking).await.unwrap();

        assert!(matches!(
            svc.delete(world.vehicle.id, world.customer.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete(world.vehicle.id, world.vendor.id).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_free_vehicle() {
        let world = fixtures::world().await;
        let svc = service(&world);
        svc.delete(world.vehicle.id, world.vendor.id).await.unwrap();
        assert!(matches!(
            svc.get(world.vehicle.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(svc.list_available().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_by_owner() {
        let world = fixtures::world().await;
        let svc = service(&world);
        fixtures::vehicle(&world.repos, world.vendor.id).await;

        assert_eq!(svc.list_by_owner(world.vendor.id).await.unwrap().len(), 2);
        assert_eq!(svc.list_available().await.unwrap().len(), 2);
        assert!(svc.list_by_owner(world.customer.id).await.unwrap().is_empty());
    }
}

//! Shared test fixtures for the application services.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::vehicle::model::tests::listing;
use crate::domain::{RepositoryProvider, User, UserRole, Vehicle};
use crate::infrastructure::InMemoryStorage;

pub struct World {
    pub repos: Arc<InMemoryStorage>,
    pub vendor: User,
    pub customer: User,
    /// Owned by `vendor`, for rent at 100000/day and for sale at 150000000
    pub vehicle: Vehicle,
}

impl World {
    pub fn provider(&self) -> Arc<dyn RepositoryProvider> {
        self.repos.clone()
    }
}

pub async fn user(repos: &InMemoryStorage, role: UserRole) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    let mut user = User::new(
        format!("{} {}", role, &tag[..6]),
        format!("{}@example.com", tag),
        "hash",
        None,
        role,
    );
    user.is_verified = role == UserRole::Vendor;
    repos.users().save(&user).await.unwrap()
}

pub async fn vehicle(repos: &InMemoryStorage, owner_id: Uuid) -> Vehicle {
    repos
        .vehicles()
        .save(&Vehicle::new(owner_id, listing()))
        .await
        .unwrap()
}

pub async fn world() -> World {
    let repos = Arc::new(InMemoryStorage::new());
    let vendor = user(&repos, UserRole::Vendor).await;
    let customer = user(&repos, UserRole::Customer).await;
    let vehicle = vehicle(&repos, vendor.id).await;
    World {
        repos,
        vendor,
        customer,
        vehicle,
    }
}

//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use async_trait::async_trait;

use super::booking::BookingRepository;
use super::chat::ChatRepository;
use super::review::ReviewRepository;
use super::sale::SalesRepository;
use super::user::UserRepository;
use super::vehicle::VehicleRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id(vehicle_id).await?;
///     let bookings = repos.bookings().find_by_renter(user_id).await?;
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn sales(&self) -> &dyn SalesRepository;
    fn reviews(&self) -> &dyn ReviewRepository;
    fn chat(&self) -> &dyn ChatRepository;

    /// Cheap round trip to the backing store
    async fn ping(&self) -> DomainResult<()>;
}

//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use super::booking_repository::SeaOrmBookingRepository;
use super::chat_repository::SeaOrmChatRepository;
use super::db_err;
use super::review_repository::SeaOrmReviewRepository;
use super::sales_repository::SeaOrmSalesRepository;
use super::user_repository::SeaOrmUserRepository;
use super::vehicle_repository::SeaOrmVehicleRepository;
use crate::domain::{
    BookingRepository, ChatRepository, DomainResult, RepositoryProvider, ReviewRepository,
    SalesRepository, UserRepository, VehicleRepository,
};

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let vehicle = repos.vehicles().find_by_id(vehicle_id).await?;
/// let pending = repos.sales().has_pending_for_vehicle(vehicle_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    users: SeaOrmUserRepository,
    vehicles: SeaOrmVehicleRepository,
    bookings: SeaOrmBookingRepository,
    sales: SeaOrmSalesRepository,
    reviews: SeaOrmReviewRepository,
    chat: SeaOrmChatRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            vehicles: SeaOrmVehicleRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            sales: SeaOrmSalesRepository::new(db.clone()),
            reviews: SeaOrmReviewRepository::new(db.clone()),
            chat: SeaOrmChatRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn sales(&self) -> &dyn SalesRepository {
        &self.sales
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        &self.reviews
    }

    fn chat(&self) -> &dyn ChatRepository {
        &self.chat
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    use super::*;
    use crate::domain::vehicle::model::tests::listing;
    use crate::domain::{
        Booking, BookingStatus, DateRange, DomainError, Message, Review, SaleStatus,
        SalesTransaction, User, UserRole, Vehicle, VehicleStatus,
    };
    use crate::infrastructure::database::migrator::Migrator;

    async fn provider() -> SeaOrmRepositoryProvider {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRepositoryProvider::new(db)
    }

    async fn seed(repos: &SeaOrmRepositoryProvider) -> (User, User, Vehicle) {
        let vendor = repos
            .users()
            .save(&User::new("Vendor", "vendor@example.com", "h", None, UserRole::Vendor))
            .await
            .unwrap();
        let customer = repos
            .users()
            .save(&User::new("Customer", "customer@example.com", "h", None, UserRole::Customer))
            .await
            .unwrap();
        let vehicle = repos
            .vehicles()
            .save(&Vehicle::new(vendor.id, listing()))
            .await
            .unwrap();
        (vendor, customer, vehicle)
    }

    fn booking(renter: Uuid, vehicle: Uuid, start: &str, end: &str) -> Booking {
        Booking::pending(
            Uuid::new_v4(),
            renter,
            vehicle,
            DateRange::parse(start, end).unwrap(),
            300_000,
            "tok",
            "http://pay/tok",
        )
    }

    #[tokio::test]
    async fn ping_succeeds() {
        provider().await.ping().await.unwrap();
    }

    #[tokio::test]
    async fn vehicle_round_trip_keeps_features() {
        let repos = provider().await;
        let (vendor, _, vehicle) = seed(&repos).await;

        let loaded = repos.vehicles().find_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(loaded.features, vec!["ac".to_string()]);
        assert_eq!(loaded.owner_id, vendor.id);

        let mut edited = loaded.clone();
        edited.rental_price_daily = Some(120_000);
        let updated = repos.vehicles().update(&edited).await.unwrap();
        assert!(updated.updated_at > loaded.updated_at);
        assert_eq!(updated.rental_price_daily, Some(120_000));

        assert_eq!(repos.vehicles().find_by_owner(vendor.id).await.unwrap().len(), 1);
        assert!(repos.vehicles().delete(vehicle.id).await.unwrap());
        assert!(!repos.vehicles().delete(vehicle.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repos = provider().await;
        seed(&repos).await;
        let dup = User::new("Again", "vendor@example.com", "h", None, UserRole::Customer);
        assert!(matches!(
            repos.users().save(&dup).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn confirmed_booking_blocks_overlapping_insert() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;

        let first = repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-01-10", "2024-01-15"))
            .await
            .unwrap();
        let confirmed = repos
            .bookings()
            .transition_status(first.id, BookingStatus::PendingPayment, BookingStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.updated_at > first.updated_at);

        let range = DateRange::parse("2024-01-14", "2024-01-20").unwrap();
        assert!(repos
            .bookings()
            .has_blocking_overlap(vehicle.id, &range)
            .await
            .unwrap());
        let clash = repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-01-14", "2024-01-20"))
            .await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));

        repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-01-16", "2024-01-20"))
            .await
            .unwrap();

        assert_eq!(repos.bookings().find_by_vehicle_owner(vendor.id).await.unwrap().len(), 2);
        assert_eq!(repos.bookings().find_by_renter(customer.id).await.unwrap().len(), 2);
        assert!(repos.bookings().has_open_for_vehicle(vehicle.id).await.unwrap());
    }

    #[tokio::test]
    async fn stale_transition_is_rejected() {
        let repos = provider().await;
        let (_, customer, vehicle) = seed(&repos).await;
        let b = repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-02-01", "2024-02-02"))
            .await
            .unwrap();

        let stale = repos
            .bookings()
            .transition_status(b.id, BookingStatus::Confirmed, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert!(stale.is_none());
        let stored = repos.bookings().find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::PendingPayment);
    }

    #[tokio::test]
    async fn sale_completion_retires_vehicle() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;
        let tx = repos
            .sales()
            .save(&SalesTransaction::pending(
                Uuid::new_v4(),
                vehicle.id,
                vendor.id,
                customer.id,
                150_000_000,
                "tok",
                "url",
            ))
            .await
            .unwrap();
        assert!(repos.sales().has_pending_for_vehicle(vehicle.id).await.unwrap());

        let done = repos.sales().complete_and_retire(tx.id).await.unwrap();
        assert!(done.is_completed());

        let retired = repos.vehicles().find_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(retired.status, VehicleStatus::Sold);
        assert!(!retired.is_for_sale && !retired.is_for_rent);
        assert!(repos.vehicles().find_available().await.unwrap().is_empty());

        let again = repos.sales().complete_and_retire(tx.id).await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));
        assert_eq!(repos.sales().find_by_buyer(customer.id).await.unwrap().len(), 1);
        assert_eq!(repos.sales().find_by_seller(vendor.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rival_sale_rolls_back_on_sold_vehicle() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;
        let rival = repos
            .users()
            .save(&User::new("Rival", "rival@example.com", "h", None, UserRole::Customer))
            .await
            .unwrap();
        let sale = |buyer: Uuid, token: &str| {
            SalesTransaction::pending(
                Uuid::new_v4(),
                vehicle.id,
                vendor.id,
                buyer,
                150_000_000,
                token,
                "url",
            )
        };
        let first = repos.sales().save(&sale(customer.id, "a")).await.unwrap();
        let second = repos.sales().save(&sale(rival.id, "b")).await.unwrap();

        repos.sales().complete_and_retire(first.id).await.unwrap();
        assert!(matches!(
            repos.sales().complete_and_retire(second.id).await,
            Err(DomainError::Conflict(_))
        ));

        let loser = repos.sales().find_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(loser.status, SaleStatus::PaymentPending);
        let sold = repos.vehicles().find_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(sold.status, VehicleStatus::Sold);
    }

    #[tokio::test]
    async fn listing_update_cannot_touch_sold_vehicle() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;

        let mut forged = vehicle.clone();
        forged.status = VehicleStatus::Sold;
        forged.owner_id = customer.id;
        forged.color = Some("black".into());
        let updated = repos.vehicles().update(&forged).await.unwrap();
        assert_eq!(updated.status, VehicleStatus::Available);
        assert_eq!(updated.owner_id, vendor.id);
        assert_eq!(updated.color.as_deref(), Some("black"));

        let retired = repos.vehicles().retire(vehicle.id).await.unwrap().unwrap();
        assert!(retired.is_retired() && !retired.is_for_sale && !retired.is_for_rent);

        let mut stale = updated.clone();
        stale.is_for_sale = true;
        assert!(matches!(
            repos.vehicles().update(&stale).await,
            Err(DomainError::Conflict(_))
        ));
        let stored = repos.vehicles().find_by_id(vehicle.id).await.unwrap().unwrap();
        assert!(stored.is_retired() && !stored.is_for_sale);
        assert_eq!(repos.vehicles().find_all().await.unwrap().len(), 1);
        assert!(repos.vehicles().retire(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_user_removes_dependent_rows() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;
        let b = repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-03-01", "2024-03-02"))
            .await
            .unwrap();
        repos
            .reviews()
            .save(&Review::new(b.id, customer.id, vehicle.id, 4, None).unwrap())
            .await
            .unwrap();
        let c = repos
            .chat()
            .find_or_create_conversation(customer.id, vendor.id, vehicle.id)
            .await
            .unwrap();
        repos
            .chat()
            .save_message(&Message::new(c.id, customer.id, vendor.id, "halo").unwrap())
            .await
            .unwrap();
        repos
            .sales()
            .save(&SalesTransaction::pending(
                Uuid::new_v4(),
                vehicle.id,
                vendor.id,
                customer.id,
                1,
                "tok",
                "url",
            ))
            .await
            .unwrap();

        assert_eq!(repos.users().find_all().await.unwrap().len(), 2);
        assert_eq!(repos.users().find_by_role(UserRole::Vendor).await.unwrap().len(), 1);

        assert!(repos.users().delete(customer.id).await.unwrap());
        assert!(!repos.users().delete(customer.id).await.unwrap());

        assert!(repos.bookings().find_by_id(b.id).await.unwrap().is_none());
        assert!(repos.reviews().find_by_vehicle(vehicle.id).await.unwrap().is_empty());
        assert!(repos.chat().find_conversation(c.id).await.unwrap().is_none());
        assert!(repos.sales().find_by_seller(vendor.id).await.unwrap().is_empty());
        assert!(repos.vehicles().find_by_id(vehicle.id).await.unwrap().is_some());

        assert!(repos.users().delete(vendor.id).await.unwrap());
        assert!(repos.vehicles().find_all().await.unwrap().is_empty());
        assert!(repos.users().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_review_for_booking_is_conflict() {
        let repos = provider().await;
        let (_, customer, vehicle) = seed(&repos).await;
        let b = repos
            .bookings()
            .create_if_available(&booking(customer.id, vehicle.id, "2024-02-01", "2024-02-02"))
            .await
            .unwrap();

        let review = Review::new(b.id, customer.id, vehicle.id, 5, None).unwrap();
        repos.reviews().save(&review).await.unwrap();
        let again = Review::new(b.id, customer.id, vehicle.id, 1, None).unwrap();
        assert!(matches!(
            repos.reviews().save(&again).await,
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(repos.reviews().find_by_vehicle(vehicle.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn messages_bump_conversation() {
        let repos = provider().await;
        let (vendor, customer, vehicle) = seed(&repos).await;

        let c = repos
            .chat()
            .find_or_create_conversation(customer.id, vendor.id, vehicle.id)
            .await
            .unwrap();
        let same = repos
            .chat()
            .find_or_create_conversation(customer.id, vendor.id, vehicle.id)
            .await
            .unwrap();
        assert_eq!(c.id, same.id);

        let msg = Message::new(c.id, customer.id, vendor.id, "masih ada?").unwrap();
        repos.chat().save_message(&msg).await.unwrap();

        let bumped = repos.chat().find_conversation(c.id).await.unwrap().unwrap();
        assert!(bumped.updated_at > c.updated_at);
        assert_eq!(repos.chat().find_messages(c.id).await.unwrap().len(), 1);
        assert_eq!(
            repos.chat().find_conversations_for_user(vendor.id).await.unwrap().len(),
            1
        );
    }
}

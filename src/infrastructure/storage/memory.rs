//! In-memory storage implementation
//!
//! Implements every repository trait over `DashMap`s. Multi-record
//! operations serialize on one async lock so they behave like the
//! database transactions of the SeaORM implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingRepository, BookingStatus, ChatRepository, Conversation, DateRange,
    DomainError, DomainResult, Message, RepositoryProvider, Review, ReviewRepository, SaleStatus,
    SalesRepository, SalesTransaction, User, UserRepository, UserRole, Vehicle,
    VehicleRepository, VehicleStatus,
};
use crate::shared::next_timestamp;

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStorage {
    users: DashMap<Uuid, User>,
    vehicles: DashMap<Uuid, Vehicle>,
    bookings: DashMap<Uuid, Booking>,
    sales: DashMap<Uuid, SalesTransaction>,
    reviews: DashMap<Uuid, Review>,
    conversations: DashMap<Uuid, Conversation>,
    messages: DashMap<Uuid, Message>,
    write_lock: Mutex<()>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first<T>(mut items: Vec<T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
        items.sort_by_key(|item| std::cmp::Reverse(key(item)));
        items
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryStorage {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        self
    }

    fn bookings(&self) -> &dyn BookingRepository {
        self
    }

    fn sales(&self) -> &dyn SalesRepository {
        self
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        self
    }

    fn chat(&self) -> &dyn ChatRepository {
        self
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

// ── Users ──────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryStorage {
    async fn save(&self, user: &User) -> DomainResult<User> {
        let _guard = self.write_lock.lock().await;
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        self.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn mark_verified(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut user| {
            user.is_verified = true;
            user.updated_at = next_timestamp(user.updated_at);
            user.clone()
        }))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let items = self.users.iter().map(|u| u.clone()).collect();
        Ok(Self::newest_first(items, |u: &User| u.created_at))
    }

    async fn find_by_role(&self, role: UserRole) -> DomainResult<Vec<User>> {
        let items = self
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.clone())
            .collect();
        Ok(Self::newest_first(items, |u: &User| u.created_at))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<Uuid> = self
            .vehicles
            .iter()
            .filter(|v| v.owner_id == id)
            .map(|v| v.id)
            .collect();

        self.conversations.retain(|_, c| {
            c.customer_id != id && c.vendor_id != id && !owned.contains(&c.vehicle_id)
        });
        self.messages
            .retain(|_, m| self.conversations.contains_key(&m.conversation_id));

        self.bookings
            .retain(|_, b| b.user_id != id && !owned.contains(&b.vehicle_id));
        self.reviews
            .retain(|_, r| self.bookings.contains_key(&r.booking_id));

        self.sales.retain(|_, t| {
            t.buyer_id != id && t.seller_id != id && !owned.contains(&t.vehicle_id)
        });
        self.vehicles.retain(|_, v| v.owner_id != id);
        Ok(true)
    }
}

// ── Vehicles ───────────────────────────────────────────────────

#[async_trait]
impl VehicleRepository for InMemoryStorage {
    async fn save(&self, vehicle: &Vehicle) -> DomainResult<Vehicle> {
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        Ok(self.vehicles.get(&id).map(|v| v.clone()))
    }

    async fn update(&self, vehicle: &Vehicle) -> DomainResult<Vehicle> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self
            .vehicles
            .get_mut(&vehicle.id)
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle.id))?;
        if stored.is_retired() {
            return Err(DomainError::Conflict(format!(
                "vehicle {} has already been sold",
                vehicle.id
            )));
        }
        stored.apply_listing(vehicle.listing());
        stored.updated_at = next_timestamp(stored.updated_at);
        Ok(stored.clone())
    }

    async fn retire(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        let _guard = self.write_lock.lock().await;
        Ok(self.vehicles.get_mut(&id).map(|mut vehicle| {
            vehicle.retire();
            vehicle.updated_at = next_timestamp(vehicle.updated_at);
            vehicle.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.vehicles.remove(&id).is_some())
    }

    async fn find_available(&self) -> DomainResult<Vec<Vehicle>> {
        let items = self
            .vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Available)
            .map(|v| v.clone())
            .collect();
        Ok(Self::newest_first(items, |v: &Vehicle| v.created_at))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Vehicle>> {
        let items = self
            .vehicles
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.clone())
            .collect();
        Ok(Self::newest_first(items, |v: &Vehicle| v.created_at))
    }

    async fn find_all(&self) -> DomainResult<Vec<Vehicle>> {
        let items = self.vehicles.iter().map(|v| v.clone()).collect();
        Ok(Self::newest_first(items, |v: &Vehicle| v.created_at))
    }
}

// ── Bookings ───────────────────────────────────────────────────

impl InMemoryStorage {
    fn blocking_overlap(&self, vehicle_id: Uuid, range: &DateRange) -> bool {
        self.bookings.iter().any(|b| {
            b.vehicle_id == vehicle_id && b.status.blocks_availability() && b.range().overlaps(range)
        })
    }
}

#[async_trait]
impl BookingRepository for InMemoryStorage {
    async fn create_if_available(&self, booking: &Booking) -> DomainResult<Booking> {
        let _guard = self.write_lock.lock().await;
        if self.blocking_overlap(booking.vehicle_id, &booking.range()) {
            return Err(DomainError::Conflict(
                "vehicle is already booked for the requested dates".into(),
            ));
        }
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn has_blocking_overlap(
        &self,
        vehicle_id: Uuid,
        range: &DateRange,
    ) -> DomainResult<bool> {
        Ok(self.blocking_overlap(vehicle_id, range))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn find_by_renter(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        let items = self
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.clone())
            .collect();
        Ok(Self::newest_first(items, |b: &Booking| b.created_at))
    }

    async fn find_by_vehicle_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Booking>> {
        let owned: Vec<Uuid> = self
            .vehicles
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.id)
            .collect();
        let items = self
            .bookings
            .iter()
            .filter(|b| owned.contains(&b.vehicle_id))
            .map(|b| b.clone())
            .collect();
        Ok(Self::newest_first(items, |b: &Booking| b.created_at))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> DomainResult<Option<Booking>> {
        let Some(mut booking) = self.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != expected {
            return Ok(None);
        }
        booking.status = next;
        booking.updated_at = next_timestamp(booking.updated_at);
        Ok(Some(booking.clone()))
    }

    async fn has_open_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool> {
        Ok(self
            .bookings
            .iter()
            .any(|b| b.vehicle_id == vehicle_id && BookingStatus::OPEN.contains(&b.status)))
    }
}

// ── Sales ──────────────────────────────────────────────────────

#[async_trait]
impl SalesRepository for InMemoryStorage {
    async fn save(&self, transaction: &SalesTransaction) -> DomainResult<SalesTransaction> {
        self.sales.insert(transaction.id, transaction.clone());
        Ok(transaction.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<SalesTransaction>> {
        Ok(self.sales.get(&id).map(|t| t.clone()))
    }

    async fn find_by_buyer(&self, buyer_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        let items = self
            .sales
            .iter()
            .filter(|t| t.buyer_id == buyer_id)
            .map(|t| t.clone())
            .collect();
        Ok(Self::newest_first(items, |t: &SalesTransaction| t.created_at))
    }

    async fn find_by_seller(&self, seller_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        let items = self
            .sales
            .iter()
            .filter(|t| t.seller_id == seller_id)
            .map(|t| t.clone())
            .collect();
        Ok(Self::newest_first(items, |t: &SalesTransaction| t.created_at))
    }

    async fn complete_and_retire(&self, id: Uuid) -> DomainResult<SalesTransaction> {
        let _guard = self.write_lock.lock().await;

        let transaction = self
            .sales
            .get(&id)
            .map(|t| t.clone())
            .ok_or_else(|| DomainError::not_found("SalesTransaction", id))?;
        if transaction.status != SaleStatus::PaymentPending {
            return Err(DomainError::Conflict(format!(
                "sales transaction {} is already {}",
                id, transaction.status
            )));
        }

        // Validate both records before touching either one.
        let mut vehicle = self
            .vehicles
            .get_mut(&transaction.vehicle_id)
            .ok_or_else(|| DomainError::not_found("Vehicle", transaction.vehicle_id))?;
        if vehicle.is_retired() {
            return Err(DomainError::Conflict(format!(
                "vehicle {} has already been sold",
                vehicle.id
            )));
        }
        let mut stored = self
            .sales
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("SalesTransaction", id))?;

        vehicle.retire();
        vehicle.updated_at = next_timestamp(vehicle.updated_at);
        stored.status = SaleStatus::Completed;
        stored.updated_at = next_timestamp(stored.updated_at);
        Ok(stored.clone())
    }

    async fn has_pending_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool> {
        Ok(self
            .sales
            .iter()
            .any(|t| t.vehicle_id == vehicle_id && t.status == SaleStatus::PaymentPending))
    }
}

// ── Reviews ────────────────────────────────────────────────────

#[async_trait]
impl ReviewRepository for InMemoryStorage {
    async fn save(&self, review: &Review) -> DomainResult<Review> {
        let _guard = self.write_lock.lock().await;
        if self.reviews.iter().any(|r| r.booking_id == review.booking_id) {
            return Err(DomainError::Conflict(
                "booking has already been reviewed".into(),
            ));
        }
        self.reviews.insert(review.id, review.clone());
        Ok(review.clone())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> DomainResult<Option<Review>> {
        Ok(self
            .reviews
            .iter()
            .find(|r| r.booking_id == booking_id)
            .map(|r| r.clone()))
    }

    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<Review>> {
        let items = self
            .reviews
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .map(|r| r.clone())
            .collect();
        Ok(Self::newest_first(items, |r: &Review| r.created_at))
    }
}

// ── Chat ───────────────────────────────────────────────────────

#[async_trait]
impl ChatRepository for InMemoryStorage {
    async fn find_or_create_conversation(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        vehicle_id: Uuid,
    ) -> DomainResult<Conversation> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.conversations.iter().find(|c| {
            c.customer_id == customer_id && c.vendor_id == vendor_id && c.vehicle_id == vehicle_id
        }) {
            return Ok(existing.clone());
        }
        let conversation = Conversation::new(customer_id, vendor_id, vehicle_id);
        self.conversations.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn find_conversation(&self, id: Uuid) -> DomainResult<Option<Conversation>> {
        Ok(self.conversations.get(&id).map(|c| c.clone()))
    }

    async fn find_conversations_for_user(
        &self,
        user_id: Uuid,
    ) -> DomainResult<Vec<Conversation>> {
        let items = self
            .conversations
            .iter()
            .filter(|c| c.is_participant(user_id))
            .map(|c| c.clone())
            .collect();
        Ok(Self::newest_first(items, |c: &Conversation| c.updated_at))
    }

    async fn save_message(&self, message: &Message) -> DomainResult<Message> {
        let mut conversation = self
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| DomainError::not_found("Conversation", message.conversation_id))?;
        self.messages.insert(message.id, message.clone());
        conversation.updated_at = next_timestamp(conversation.updated_at);
        Ok(message.clone())
    }

    async fn find_messages(&self, conversation_id: Uuid) -> DomainResult<Vec<Message>> {
        let mut items: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| m.clone())
            .collect();
        items.sort_by_key(|m| m.created_at);
        Ok(items)
    }
}

//! User management service
//!
//! HTTP handlers stay thin wrappers that delegate here.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    BookingStatus, DomainError, DomainResult, RepositoryProvider, SaleStatus, User, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Self-service sign-up input
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a JWT.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repos.users().find_by_email(&normalize_email(email)).await? else {
            return Err(DomainError::Unauthorized("invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            warn!(user_id = %user.id, "Rejected login with a wrong password");
            return Err(DomainError::Unauthorized("invalid credentials".into()));
        }

        let token = create_token(user.id, &user.email, user.role, &self.jwt_config)
            .map_err(|e| DomainError::Fatal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expires_in_seconds(),
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a customer or vendor. Vendors start unverified.
    pub async fn register(&self, registration: Registration) -> DomainResult<User> {
        if registration.role == UserRole::Admin {
            return Err(DomainError::Validation(
                "role must be customer or vendor".into(),
            ));
        }
        if registration.full_name.trim().is_empty() {
            return Err(DomainError::Validation("Full name is required".into()));
        }
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let email = normalize_email(&registration.email);
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password(&registration.password)?;
        let user = User::new(
            registration.full_name.trim(),
            email,
            password_hash,
            registration.phone_number,
            registration.role,
        );
        let user = self.repos.users().save(&user).await?;

        info!(user_id = %user.id, role = %user.role, "New user registered");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    // ── Administration ──────────────────────────────────────────

    /// Mark a vendor account as verified so it may list vehicles.
    pub async fn verify_vendor(&self, vendor_id: Uuid) -> DomainResult<User> {
        let user = self.get_user(vendor_id).await?;
        if !user.is_vendor() {
            return Err(DomainError::Validation("user is not a vendor".into()));
        }
        let user = self
            .repos
            .users()
            .mark_verified(vendor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", vendor_id))?;
        info!(user_id = %vendor_id, "Vendor verified");
        Ok(user)
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repos.users().find_all().await
    }

    /// Vendor accounts, verified or not.
    pub async fn list_vendors(&self) -> DomainResult<Vec<User>> {
        self.repos.users().find_by_role(UserRole::Vendor).await
    }

    /// Delete an account and everything attached to it.
    ///
    /// Admin accounts are never deleted, and nor is anyone with a rental
    /// or a purchase still in flight.
    pub async fn delete_user(&self, id: Uuid) -> DomainResult<()> {
        let user = self.get_user(id).await?;
        if user.role == UserRole::Admin {
            return Err(DomainError::Conflict("admin accounts cannot be deleted".into()));
        }

        let bookings = self.repos.bookings();
        let mut involved = bookings.find_by_renter(id).await?;
        involved.extend(bookings.find_by_vehicle_owner(id).await?);
        if involved.iter().any(|b| BookingStatus::OPEN.contains(&b.status)) {
            return Err(DomainError::Conflict("user has bookings in progress".into()));
        }

        let sales = self.repos.sales();
        let mut trades = sales.find_by_buyer(id).await?;
        trades.extend(sales.find_by_seller(id).await?);
        if trades.iter().any(|t| t.status == SaleStatus::PaymentPending) {
            return Err(DomainError::Conflict("user has a pending sale".into()));
        }

        if !self.repos.users().delete(id).await? {
            return Err(DomainError::not_found("User", id));
        }
        info!(user_id = %id, role = %user.role, "User deleted");
        Ok(())
    }

    /// Seed an admin account on an empty user table.
    ///
    /// Returns the created admin, or `None` when users already exist.
    pub async fn ensure_default_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> DomainResult<Option<User>> {
        if self.repos.users().count().await? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(password)?;
        let mut admin = User::new(
            full_name,
            normalize_email(email),
            password_hash,
            None,
            UserRole::Admin,
        );
        admin.is_verified = true;
        let admin = self.repos.users().save(&admin).await?;

        info!(user_id = %admin.id, email = %admin.email, "Default admin account created");
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::domain::{Booking, DateRange};
    use crate::infrastructure::crypto::jwt::verify_token;
    use crate::infrastructure::InMemoryStorage;

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryStorage::new()),
            JwtConfig::new("test-secret", 1),
        )
    }

    fn registration(email: &str, role: UserRole) -> Registration {
        Registration {
            full_name: "Budi Santoso".into(),
            email: email.into(),
            password: "s3cret-pass".into(),
            phone_number: Some("+62811000000".into()),
            role,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = service();
        let user = svc
            .register(registration("Budi@Example.com", UserRole::Customer))
            .await
            .unwrap();
        assert_eq!(user.email, "budi@example.com");
        assert_ne!(user.password_hash, "s3cret-pass");

        let auth = svc.login("budi@example.com", "s3cret-pass").await.unwrap();
        assert_eq!(auth.token_type, "Bearer");
        assert_eq!(auth.expires_in, 3600);

        let claims = verify_token(&auth.token, svc.jwt_config()).unwrap();
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.role, UserRole::Customer);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let svc = service();
        svc.register(registration("a@example.com", UserRole::Customer))
            .await
            .unwrap();

        assert!(matches!(
            svc.login("a@example.com", "wrong-password").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.login("nobody@example.com", "s3cret-pass").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn registration_validation() {
        let svc = service();

        let mut short = registration("s@example.com", UserRole::Customer);
        short.password = "short".into();
        assert!(matches!(svc.register(short).await, Err(DomainError::Validation(_))));

        assert!(matches!(
            svc.register(registration("no-at-sign", UserRole::Customer)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.register(registration("x@example.com", UserRole::Admin)).await,
            Err(DomainError::Validation(_))
        ));

        svc.register(registration("dup@example.com", UserRole::Vendor))
            .await
            .unwrap();
        assert!(matches!(
            svc.register(registration("DUP@example.com", UserRole::Customer)).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn vendor_verification() {
        let svc = service();
        let vendor = svc
            .register(registration("v@example.com", UserRole::Vendor))
            .await
            .unwrap();
        assert!(!vendor.can_list_vehicles());

        let verified = svc.verify_vendor(vendor.id).await.unwrap();
        assert!(verified.can_list_vehicles());

        let customer = svc
            .register(registration("c@example.com", UserRole::Customer))
            .await
            .unwrap();
        assert!(matches!(
            svc.verify_vendor(customer.id).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.verify_vendor(Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn default_admin_only_on_empty_table() {
        let svc = service();
        let admin = svc
            .ensure_default_admin("admin@marketplace.local", "admin-password", "Administrator")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(svc.login("admin@marketplace.local", "admin-password").await.is_ok());

        assert!(svc
            .ensure_default_admin("other@marketplace.local", "admin-password", "Other")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn admin_listings() {
        let svc = service();
        svc.register(registration("c@example.com", UserRole::Customer))
            .await
            .unwrap();
        let vendor = svc
            .register(registration("v@example.com", UserRole::Vendor))
            .await
            .unwrap();

        assert_eq!(svc.list_users().await.unwrap().len(), 2);
        let vendors = svc.list_vendors().await.unwrap();
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].id, vendor.id);
    }

    #[tokio::test]
    async fn delete_user_guards_and_cascades() {
        let world = fixtures::world().await;
        let svc = UserService::new(world.provider(), JwtConfig::new("test-secret", 1));

        let booking = Booking::pending(
            Uuid::new_v4(),
            world.customer.id,
            world.vehicle.id,
            DateRange::parse("2024-07-01", "2024-07-02").unwrap(),
            200_000,
            "BOOK-z",
            "https://pay.example/z",
        );
        world.repos.bookings().create_if_available(&booking).await.unwrap();

        // Both sides of an open rental are protected
        assert!(matches!(
            svc.delete_user(world.customer.id).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            svc.delete_user(world.vendor.id).await,
            Err(DomainError::Conflict(_))
        ));

        world
            .repos
            .bookings()
            .transition_status(booking.id, BookingStatus::PendingPayment, BookingStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        svc.delete_user(world.vendor.id).await.unwrap();

        assert!(world.repos.vehicles().find_by_id(world.vehicle.id).await.unwrap().is_none());
        assert!(world.repos.bookings().find_by_id(booking.id).await.unwrap().is_none());
        assert!(svc.get_user(world.customer.id).await.is_ok());
        assert!(matches!(
            svc.delete_user(world.vendor.id).await,
            Err(DomainError::NotFound { .. })
        ));

    }

    #[tokio::test]
    async fn admin_accounts_are_not_deletable() {
        let svc = service();
        let admin = svc
            .ensure_default_admin("admin@marketplace.local", "admin-password", "Administrator")
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            svc.delete_user(admin.id).await,
            Err(DomainError::Conflict(_))
        ));
    }
}

//! User domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::errors::DomainError;

/// Account role. Roles gate routes; ownership checks always go
/// through the stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Vendor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::Validation(format!("unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    /// Vendors must be verified by an admin before they may list vehicles.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        phone_number: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            phone_number,
            role,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_vendor(&self) -> bool {
        self.role == UserRole::Vendor
    }

    pub fn can_list_vehicles(&self) -> bool {
        self.is_vendor() && self.is_verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [UserRole::Customer, UserRole::Vendor, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn new_vendor_cannot_list_until_verified() {
        let mut vendor = User::new("Rina", "rina@example.com", "hash", None, UserRole::Vendor);
        assert!(!vendor.can_list_vehicles());
        vendor.is_verified = true;
        assert!(vendor.can_list_vehicles());
    }

    #[test]
    fn verified_customer_still_cannot_list() {
        let mut customer = User::new("Budi", "budi@example.com", "hash", None, UserRole::Customer);
        customer.is_verified = true;
        assert!(!customer.can_list_vehicles());
    }
}

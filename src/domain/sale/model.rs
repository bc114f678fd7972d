//! Sales transaction domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStatus {
    PaymentPending,
    /// Paid; the vehicle has been retired
    Completed,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentPending => "payment_pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for SaleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_pending" => Ok(Self::PaymentPending),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!("unknown sale status '{}'", other))),
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-time purchase of a vehicle. The price is a snapshot taken when
/// the purchase was initiated and never follows later listing edits.
#[derive(Debug, Clone)]
pub struct SalesTransaction {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub agreed_price: i64,
    pub status: SaleStatus,
    pub payment_token: String,
    pub payment_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesTransaction {
    pub fn pending(
        id: Uuid,
        vehicle_id: Uuid,
        seller_id: Uuid,
        buyer_id: Uuid,
        agreed_price: i64,
        payment_token: impl Into<String>,
        payment_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            vehicle_id,
            seller_id,
            buyer_id,
            agreed_price,
            status: SaleStatus::PaymentPending,
            payment_token: payment_token.into(),
            payment_url: payment_url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }
}

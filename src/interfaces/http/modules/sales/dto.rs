//! Sales DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::SalesTransaction;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesTransactionDto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    /// Sale price captured when the purchase was opened
    pub agreed_price: i64,
    /// payment_pending or completed
    pub status: String,
    pub payment_token: String,
    pub payment_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalesTransaction> for SalesTransactionDto {
    fn from(t: SalesTransaction) -> Self {
        Self {
            id: t.id,
            vehicle_id: t.vehicle_id,
            seller_id: t.seller_id,
            buyer_id: t.buyer_id,
            agreed_price: t.agreed_price,
            status: t.status.as_str().to_string(),
            payment_token: t.payment_token,
            payment_url: t.payment_url,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

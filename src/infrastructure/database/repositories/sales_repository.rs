//! SeaORM implementation of SalesRepository

use async_trait::async_trait;
use log::{debug, warn};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{corrupt, db_err};
use crate::domain::{
    DomainError, DomainResult, SaleStatus, SalesRepository, SalesTransaction, VehicleStatus,
};
use crate::infrastructure::database::entities::{sales_transaction, vehicle};
use crate::shared::next_timestamp;

pub struct SeaOrmSalesRepository {
    db: DatabaseConnection,
}

impl SeaOrmSalesRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: sales_transaction::Model) -> DomainResult<SalesTransaction> {
    Ok(SalesTransaction {
        id: m.id,
        vehicle_id: m.vehicle_id,
        seller_id: m.seller_id,
        buyer_id: m.buyer_id,
        agreed_price: m.agreed_price,
        status: m
            .status
            .parse()
            .map_err(|e| corrupt("sales_transactions", e))?,
        payment_token: m.payment_token,
        payment_url: m.payment_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<sales_transaction::Model>) -> DomainResult<Vec<SalesTransaction>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── SalesRepository impl ────────────────────────────────────────

#[async_trait]
impl SalesRepository for SeaOrmSalesRepository {
    async fn save(&self, t: &SalesTransaction) -> DomainResult<SalesTransaction> {
        debug!("Saving sales transaction: {} (vehicle {})", t.id, t.vehicle_id);

        let model = sales_transaction::ActiveModel {
            id: Set(t.id),
            vehicle_id: Set(t.vehicle_id),
            seller_id: Set(t.seller_id),
            buyer_id: Set(t.buyer_id),
            agreed_price: Set(t.agreed_price),
            status: Set(t.status.as_str().to_string()),
            payment_token: Set(t.payment_token.clone()),
            payment_url: Set(t.payment_url.clone()),
            created_at: Set(t.created_at),
            updated_at: Set(t.updated_at),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<SalesTransaction>> {
        let model = sales_transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_buyer(&self, buyer_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        let models = sales_transaction::Entity::find()
            .filter(sales_transaction::Column::BuyerId.eq(buyer_id))
            .order_by_desc(sales_transaction::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_seller(&self, seller_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        let models = sales_transaction::Entity::find()
            .filter(sales_transaction::Column::SellerId.eq(seller_id))
            .order_by_desc(sales_transaction::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn complete_and_retire(&self, id: Uuid) -> DomainResult<SalesTransaction> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let current = sales_transaction::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("SalesTransaction", id))?;

        let pending = SaleStatus::PaymentPending.as_str();
        let completed_at = next_timestamp(current.updated_at);
        let result = sales_transaction::Entity::update_many()
            .col_expr(
                sales_transaction::Column::Status,
                Expr::value(SaleStatus::Completed.as_str()),
            )
            .col_expr(sales_transaction::Column::UpdatedAt, Expr::value(completed_at))
            .filter(sales_transaction::Column::Id.eq(id))
            .filter(sales_transaction::Column::Status.eq(pending))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "sales transaction {} is no longer {}",
                id, pending
            )));
        }

        let Some(stored_vehicle) = vehicle::Entity::find_by_id(current.vehicle_id)
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            warn!(
                "Sale {} references missing vehicle {}, rolling back",
                id, current.vehicle_id
            );
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::not_found("Vehicle", current.vehicle_id));
        };

        // Only an available vehicle can be retired; a rival sale that
        // committed first leaves this one pending.
        let retired = vehicle::Entity::update_many()
            .col_expr(
                vehicle::Column::Status,
                Expr::value(VehicleStatus::Sold.as_str()),
            )
            .col_expr(vehicle::Column::IsForSale, Expr::value(false))
            .col_expr(vehicle::Column::IsForRent, Expr::value(false))
            .col_expr(
                vehicle::Column::UpdatedAt,
                Expr::value(next_timestamp(stored_vehicle.updated_at)),
            )
            .filter(vehicle::Column::Id.eq(current.vehicle_id))
            .filter(vehicle::Column::Status.eq(VehicleStatus::Available.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if retired.rows_affected == 0 {
            warn!(
                "Sale {} lost the race for vehicle {}, rolling back",
                id, current.vehicle_id
            );
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "vehicle {} has already been sold",
                current.vehicle_id
            )));
        }

        txn.commit().await.map_err(db_err)?;
        debug!("Sale {} completed, vehicle {} retired", id, current.vehicle_id);

        let mut completed = model_to_domain(current)?;
        completed.status = SaleStatus::Completed;
        completed.updated_at = completed_at;
        Ok(completed)
    }

    async fn has_pending_for_vehicle(&self, vehicle_id: Uuid) -> DomainResult<bool> {
        let count = sales_transaction::Entity::find()
            .filter(sales_transaction::Column::VehicleId.eq(vehicle_id))
            .filter(sales_transaction::Column::Status.eq(SaleStatus::PaymentPending.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}

//! Sales lifecycle engine
//!
//! `payment_pending → completed`; completion retires the vehicle in the
//! same unit of work.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::payments::PaymentLinks;
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, SalesTransaction, Vehicle, VehicleStatus,
};
use crate::observability::{
    SALES_COMPLETED_TOTAL, SALES_INITIATED_TOTAL, SALE_RECONCILIATIONS_TOTAL,
};

pub struct SalesService {
    repos: Arc<dyn RepositoryProvider>,
    payments: PaymentLinks,
}

impl SalesService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, payments: PaymentLinks) -> Self {
        Self { repos, payments }
    }

    async fn load_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))
    }

    /// Open a purchase at the vehicle's current sale price.
    pub async fn initiate_purchase(
        &self,
        vehicle_id: Uuid,
        buyer_id: Uuid,
    ) -> DomainResult<SalesTransaction> {
        let vehicle = self.load_vehicle(vehicle_id).await?;

        if !vehicle.is_for_sale {
            return Err(DomainError::Conflict("vehicle is not for sale".into()));
        }
        if vehicle.status != VehicleStatus::Available {
            return Err(DomainError::Conflict(format!(
                "vehicle is {}",
                vehicle.status
            )));
        }
        if vehicle.is_owned_by(buyer_id) {
            return Err(DomainError::Conflict(
                "owners cannot buy their own vehicle".into(),
            ));
        }
        let agreed_price = vehicle
            .sale_price
            .ok_or_else(|| DomainError::Validation("vehicle has no sale price".into()))?;

        let id = Uuid::new_v4();
        let link = self.payments.for_sale(id);
        let transaction = SalesTransaction::pending(
            id,
            vehicle.id,
            vehicle.owner_id,
            buyer_id,
            agreed_price,
            link.token,
            link.url,
        );
        let transaction = self.repos.sales().save(&transaction).await?;

        metrics::counter!(SALES_INITIATED_TOTAL).increment(1);
        info!(
            transaction_id = %transaction.id,
            vehicle_id = %vehicle_id,
            buyer_id = %buyer_id,
            agreed_price,
            "Purchase initiated, awaiting payment"
        );
        Ok(transaction)
    }

    /// Apply a successful payment: complete the transaction and retire
    /// the vehicle atomically.
    ///
    /// Confirming an already completed transaction is a no-op, except that
    /// a vehicle found still on the market is retired again.
    pub async fn confirm_sale(&self, transaction_id: Uuid) -> DomainResult<SalesTransaction> {
        let transaction = self
            .repos
            .sales()
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("SalesTransaction", transaction_id))?;

        if transaction.is_completed() {
            debug!(transaction_id = %transaction_id, "Sale already completed");
            self.reconcile_retirement(&transaction).await?;
            return Ok(transaction);
        }

        let vehicle = self.load_vehicle(transaction.vehicle_id).await?;
        if vehicle.is_retired() {
            warn!(
                transaction_id = %transaction_id,
                vehicle_id = %vehicle.id,
                "Payment received for a vehicle that was already sold"
            );
            return Err(DomainError::Conflict(format!(
                "vehicle {} has already been sold",
                vehicle.id
            )));
        }

        match self.repos.sales().complete_and_retire(transaction_id).await {
            Ok(completed) => {
                metrics::counter!(SALES_COMPLETED_TOTAL).increment(1);
                info!(
                    transaction_id = %transaction_id,
                    vehicle_id = %completed.vehicle_id,
                    "Sale completed, vehicle retired"
                );
                Ok(completed)
            }
            Err(DomainError::Conflict(reason)) => {
                // Another callback may have completed it first.
                match self.repos.sales().find_by_id(transaction_id).await? {
                    Some(current) if current.is_completed() => Ok(current),
                    _ => Err(DomainError::Conflict(reason)),
                }
            }
            Err(e) => {
                error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "Sale completion failed, nothing was committed"
                );
                Err(DomainError::Fatal(format!(
                    "could not complete sale {}: {}",
                    transaction_id, e
                )))
            }
        }
    }

    async fn reconcile_retirement(&self, transaction: &SalesTransaction) -> DomainResult<()> {
        let Some(vehicle) = self
            .repos
            .vehicles()
            .find_by_id(transaction.vehicle_id)
            .await?
        else {
            return Ok(());
        };
        if vehicle.is_retired() && !vehicle.is_for_sale && !vehicle.is_for_rent {
            return Ok(());
        }

        warn!(
            transaction_id = %transaction.id,
            vehicle_id = %vehicle.id,
            "Completed sale left its vehicle on the market, retiring it"
        );
        self.repos
            .vehicles()
            .retire(vehicle.id)
            .await
            .map_err(|e| DomainError::Fatal(format!("could not retire vehicle {}: {}", vehicle.id, e)))?;
        metrics::counter!(SALE_RECONCILIATIONS_TOTAL).increment(1);
        Ok(())
    }

    pub async fn purchases_by_buyer(&self, buyer_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        self.repos.sales().find_by_buyer(buyer_id).await
    }

    pub async fn sales_by_seller(&self, seller_id: Uuid) -> DomainResult<Vec<SalesTransaction>> {
        self.repos.sales().find_by_seller(seller_id).await
    }
}

// ── Tests ──────────────────────────────────────────────────────

//! Payment service: payment-gated rentals and settlement reconciliation
//!
//! Webhook and client poll both end in [`PaymentService::reconcile`], which
//! hands the mutation to the idempotent ledger settlement. Whichever path
//! sees a final gateway status first performs the transition; the other one
//! observes it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::lock_dispatcher::LockDispatcher;
use crate::application::ports::PaymentGateway;
use crate::domain::payment::{GatewayStatus, PaymentHandle, PaymentOutcome, PaymentRequest, PollStatus};
use crate::domain::{
    DomainError, DomainResult, NewPendingRental, RepositoryProvider, Settlement, TransactionStatus,
};

/// Pricing and client-side settings for the payment flow
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Price of one rental in the smallest currency unit
    pub rental_price: i64,
    /// Public key handed to the payment page
    pub client_key: String,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            rental_price: 10_000,
            client_key: String::new(),
        }
    }
}

/// `ORDER-{unix seconds}-{8 hex}`
pub fn generate_order_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("ORDER-{}-{}", chrono::Utc::now().timestamp(), &suffix[..8])
}

pub struct PaymentService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn PaymentGateway>,
    locks: Arc<LockDispatcher>,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: Arc<dyn PaymentGateway>,
        locks: Arc<LockDispatcher>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            repos,
            gateway,
            locks,
            settings,
        }
    }

    pub fn client_key(&self) -> &str {
        &self.settings.client_key
    }

    /// Open a payment for renting at `station_id` and record the rental as
    /// `Pending`. No unit is reserved until the payment settles.
    pub async fn create_pending_payment(
        &self,
        user_id: &str,
        station_id: i32,
    ) -> DomainResult<PaymentHandle> {
        let user = self
            .repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", user_id))?;
        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", station_id))?;
        if !station.has_available() {
            return Err(DomainError::NoInventory { station_id });
        }

        let order_id = generate_order_id();
        let request = PaymentRequest {
            order_id: order_id.clone(),
            amount: self.settings.rental_price,
            customer_name: user.username.clone(),
            customer_email: user.email.clone(),
            item_id: station_id.to_string(),
            item_name: "Powerbank Rental".to_string(),
        };
        let session = self.gateway.create_payment(&request).await?;

        let tx = self
            .repos
            .ledger()
            .create_pending(NewPendingRental {
                user_id: user.id,
                origin_station_id: station_id,
                order_id: order_id.clone(),
                payment_token: Some(session.token.clone()),
                payment_redirect_url: Some(session.redirect_url.clone()),
                amount: Some(self.settings.rental_price),
            })
            .await?;

        info!(transaction_id = tx.id, %order_id, station_id, "Payment created");
        Ok(PaymentHandle {
            transaction_id: tx.id,
            order_id,
            token: session.token,
            redirect_url: session.redirect_url,
            amount: self.settings.rental_price,
        })
    }

    /// Apply a gateway status to the ledger. `Ok(None)` means the status
    /// requires no mutation.
    pub async fn reconcile(
        &self,
        order_id: &str,
        status: &GatewayStatus,
    ) -> DomainResult<Option<Settlement>> {
        let settlement = match status.outcome() {
            PaymentOutcome::Paid => self.repos.ledger().settle_success(order_id).await?,
            PaymentOutcome::Failed => self.repos.ledger().settle_failure(order_id).await?,
            PaymentOutcome::Pending => {
                debug!(order_id, %status, "Payment still pending");
                return Ok(None);
            }
        };

        if settlement.transitioned {
            metrics::counter!(
                "payments_settled_total",
                "outcome" => settlement.transaction.status.as_str()
            )
            .increment(1);
        }

        if settlement.started_rental() {
            metrics::counter!("rentals_started_total", "flow" => "payment").increment(1);
            self.locks
                .dispatch_open_at(
                    self.repos.stations(),
                    settlement.transaction.origin_station_id,
                )
                .await;
        }

        Ok(Some(settlement))
    }

    /// Client poll. Terminal and ongoing rentals answer from the ledger;
    /// pending ones ask the gateway, and any gateway trouble reads as
    /// pending.
    pub async fn poll_payment_status(
        &self,
        user_id: &str,
        transaction_id: i32,
    ) -> DomainResult<PollStatus> {
        let tx = match self.repos.transactions().find_by_id(transaction_id).await? {
            Some(tx) if tx.belongs_to(user_id) => tx,
            _ => return Err(DomainError::not_found("Transaction", "id", transaction_id)),
        };

        if !tx.is_pending() {
            return Ok(poll_answer(transaction_id, tx.status));
        }

        let Some(order_id) = tx.order_id.as_deref() else {
            return Ok(PollStatus::Pending);
        };

        let status = match self.gateway.query_status(order_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(transaction_id, order_id, error = %e, "Payment status query failed");
                return Ok(PollStatus::Pending);
            }
        };

        Ok(match self.reconcile(order_id, &status).await? {
            Some(settlement) => poll_answer(transaction_id, settlement.transaction.status),
            None => PollStatus::Pending,
        })
    }

    /// Gateway push. The payload is only trusted for the order id; the
    /// status is fetched from the gateway. Transient failures are returned
    /// so the push is answered with an error and redelivered; an unknown
    /// order is not.
    pub async fn handle_notification(&self, order_id: &str) -> DomainResult<Option<Settlement>> {
        let status = self.gateway.query_status(order_id).await.map_err(|e| {
            warn!(order_id, error = %e, "Notification status query failed");
            DomainError::from(e)
        })?;

        match self.reconcile(order_id, &status).await {
            Ok(settlement) => Ok(settlement),
            Err(e) if e.is_transient() => {
                warn!(order_id, %status, error = %e, "Notification not applied");
                Err(e)
            }
            Err(e) => {
                debug!(order_id, %status, error = %e, "Notification ignored");
                Ok(None)
            }
        }
    }
}

fn poll_answer(transaction_id: i32, status: TransactionStatus) -> PollStatus {
    match status {
        TransactionStatus::Ongoing | TransactionStatus::Returned => {
            PollStatus::Success { transaction_id }
        }
        TransactionStatus::Failed => PollStatus::Failed,
        TransactionStatus::Pending => PollStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ids_are_unique_within_a_second() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert!(a.starts_with("ORDER-"));
        assert_eq!(a.rsplit('-').next().map(str::len), Some(8));
        assert_ne!(a, b);
    }

    #[test]
    fn poll_answer_maps_ledger_state() {
        assert_eq!(
            poll_answer(4, TransactionStatus::Returned),
            PollStatus::Success { transaction_id: 4 }
        );
        assert_eq!(poll_answer(4, TransactionStatus::Failed), PollStatus::Failed);
        assert_eq!(poll_answer(4, TransactionStatus::Pending), PollStatus::Pending);
    }
}

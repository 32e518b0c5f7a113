//! Rental ledger and transaction repository interfaces

use async_trait::async_trait;

use super::model::{NewPendingRental, Settlement, Transaction};
use crate::domain::DomainResult;

/// Read access to rental transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>>;
    async fn find_by_order_id(&self, order_id: &str) -> DomainResult<Option<Transaction>>;
    /// Newest first
    async fn find_by_user(&self, user_id: &str) -> DomainResult<Vec<Transaction>>;
    async fn find_ongoing_for_user(&self, user_id: &str) -> DomainResult<Option<Transaction>>;
}

/// The ledger: every lifecycle transition together with its inventory side
/// effects, each call one atomic unit against the store.
///
/// Errors abort the unit and leave stations, powerbanks and transactions
/// untouched.
#[async_trait]
pub trait RentalLedger: Send + Sync {
    /// Reserve a unit at `station_id` and record an `Ongoing` rental.
    async fn create_ongoing(&self, user_id: &str, station_id: i32) -> DomainResult<Transaction>;

    /// Record a `Pending` rental awaiting payment. No unit is reserved.
    async fn create_pending(&self, rental: NewPendingRental) -> DomainResult<Transaction>;

    /// Payment confirmed. `Pending` becomes `Ongoing` (unit reserved) or
    /// `Failed` (no inventory). Any other state is returned unchanged.
    async fn settle_success(&self, order_id: &str) -> DomainResult<Settlement>;

    /// Payment denied, expired or cancelled. `Pending` becomes `Failed`;
    /// any other state is returned unchanged.
    async fn settle_failure(&self, order_id: &str) -> DomainResult<Settlement>;

    /// Dock the rented unit at `station_id`. Only valid from `Ongoing`.
    async fn return_at(&self, transaction_id: i32, station_id: i32) -> DomainResult<Transaction>;
}

//! Rental service: immediate rentals, returns and lock re-opens

use std::sync::Arc;

use tracing::{debug, info};

use super::lock_dispatcher::LockDispatcher;
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Station, StationInventory, Transaction,
};

pub struct RentalService {
    repos: Arc<dyn RepositoryProvider>,
    locks: Arc<LockDispatcher>,
}

impl RentalService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, locks: Arc<LockDispatcher>) -> Self {
        Self { repos, locks }
    }

    pub async fn list_stations(&self) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_all().await
    }

    pub async fn list_available_stations(&self) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_available().await
    }

    pub async fn list_returnable_stations(&self) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_returnable().await
    }

    async fn station(&self, station_id: i32) -> DomainResult<Station> {
        self.repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", station_id))
    }

    /// Rent a powerbank without payment. The lock is opened in the
    /// background once the rental is recorded.
    pub async fn start_rental(&self, user_id: &str, station_id: i32) -> DomainResult<Transaction> {
        let tx = self.repos.ledger().create_ongoing(user_id, station_id).await?;
        metrics::counter!("rentals_started_total", "flow" => "immediate").increment(1);

        self.locks
            .dispatch_open_at(self.repos.stations(), station_id)
            .await;
        Ok(tx)
    }

    /// Return the powerbank of `transaction_id` to `station_id`.
    pub async fn return_powerbank(
        &self,
        user_id: &str,
        transaction_id: i32,
        station_id: i32,
    ) -> DomainResult<Transaction> {
        self.get_rental(user_id, transaction_id).await?;

        let tx = self.repos.ledger().return_at(transaction_id, station_id).await?;
        metrics::counter!("rentals_returned_total").increment(1);

        self.locks
            .dispatch_open_at(self.repos.stations(), station_id)
            .await;
        Ok(tx)
    }

    /// Send another `open` to the station the rental currently involves and
    /// wait for the outcome.
    pub async fn retry_open(&self, user_id: &str, transaction_id: i32) -> DomainResult<Station> {
        let tx = self.get_rental(user_id, transaction_id).await?;
        let station_id = tx.lock_station_id().ok_or(DomainError::InvalidTransition {
            transaction_id,
            status: tx.status,
            operation: "reopen",
        })?;

        let station = self.station(station_id).await?;
        self.locks.retry_open(&station.address).await?;
        info!(transaction_id, station_id, "Lock re-opened on request");
        Ok(station)
    }

    pub async fn active_rental(&self, user_id: &str) -> DomainResult<Option<Transaction>> {
        self.repos.transactions().find_ongoing_for_user(user_id).await
    }

    /// All rentals of the user, newest first.
    pub async fn history(&self, user_id: &str) -> DomainResult<Vec<Transaction>> {
        self.repos.transactions().find_by_user(user_id).await
    }

    /// A rental owned by `user_id`. Someone else's rental is reported as
    /// missing.
    pub async fn get_rental(&self, user_id: &str, transaction_id: i32) -> DomainResult<Transaction> {
        match self.repos.transactions().find_by_id(transaction_id).await? {
            Some(tx) if tx.belongs_to(user_id) => Ok(tx),
            Some(_) => {
                debug!(transaction_id, user_id, "Rental belongs to another user");
                Err(DomainError::not_found("Transaction", "id", transaction_id))
            }
            None => Err(DomainError::not_found("Transaction", "id", transaction_id)),
        }
    }

    pub async fn inventory_report(&self) -> DomainResult<Vec<StationInventory>> {
        self.repos.stations().inventory_report().await
    }
}

//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives unified access to all per-aggregate
//! repositories and the rental ledger.

use super::powerbank::PowerbankRepository;
use super::rental::{RentalLedger, TransactionRepository};
use super::station::StationRepository;
use super::user::UserRepository;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let stations = repos.stations().find_available().await?;
///     let tx = repos.ledger().create_ongoing("user-1", stations[0].id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn stations(&self) -> &dyn StationRepository;
    fn powerbanks(&self) -> &dyn PowerbankRepository;
    fn transactions(&self) -> &dyn TransactionRepository;
    fn users(&self) -> &dyn UserRepository;
    fn ledger(&self) -> &dyn RentalLedger;
}

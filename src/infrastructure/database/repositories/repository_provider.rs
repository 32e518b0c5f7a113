//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::powerbank::PowerbankRepository;
use crate::domain::rental::{RentalLedger, TransactionRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::station::StationRepository;
use crate::domain::user::UserRepository;

use super::ledger_repository::SeaOrmRentalLedger;
use super::powerbank_repository::SeaOrmPowerbankRepository;
use super::station_repository::SeaOrmStationRepository;
use super::transaction_repository::SeaOrmTransactionRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let station = repos.stations().find_by_id(1).await?;
/// let tx = repos.ledger().create_ongoing(&user.id, 1).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    stations: SeaOrmStationRepository,
    powerbanks: SeaOrmPowerbankRepository,
    transactions: SeaOrmTransactionRepository,
    users: SeaOrmUserRepository,
    ledger: SeaOrmRentalLedger,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            stations: SeaOrmStationRepository::new(db.clone()),
            powerbanks: SeaOrmPowerbankRepository::new(db.clone()),
            transactions: SeaOrmTransactionRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            ledger: SeaOrmRentalLedger::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn powerbanks(&self) -> &dyn PowerbankRepository {
        &self.powerbanks
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        &self.transactions
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn ledger(&self) -> &dyn RentalLedger {
        &self.ledger
    }
}

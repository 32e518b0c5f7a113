//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories, the rental ledger and the unified
//! RepositoryProvider.

mod inventory;
pub mod ledger_repository;
pub mod powerbank_repository;
pub mod repository_provider;
pub mod station_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use ledger_repository::SeaOrmRentalLedger;
pub use powerbank_repository::SeaOrmPowerbankRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use station_repository::SeaOrmStationRepository;
pub use transaction_repository::SeaOrmTransactionRepository;
pub use user_repository::SeaOrmUserRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

//! Rental aggregate
//!
//! The transaction ledger: entity, lifecycle, and the interfaces the
//! infrastructure layer implements atomically.

pub mod model;
pub mod repository;

pub use model::{NewPendingRental, Settlement, Transaction, TransactionStatus};
pub use repository::{RentalLedger, TransactionRepository};

//! Domain layer: entities, lifecycle rules and repository interfaces

pub mod payment;
pub mod powerbank;
pub mod rental;
pub mod repositories;
pub mod station;
pub mod user;

pub use payment::{GatewayStatus, PaymentHandle, PaymentOutcome, PollStatus};
pub use powerbank::{Powerbank, PowerbankStatus};
pub use rental::{NewPendingRental, RentalLedger, Settlement, Transaction, TransactionStatus};
pub use repositories::RepositoryProvider;
pub use station::{Station, StationInventory};
pub use user::{NewUser, User};

pub use crate::shared::types::errors::{DomainError, DomainResult};

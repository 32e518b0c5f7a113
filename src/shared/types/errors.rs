use thiserror::Error;

use crate::domain::rental::TransactionStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No available powerbank at the station. The user can pick another one.
    #[error("No powerbank available at station {station_id}")]
    NoInventory { station_id: i32 },

    /// Every slot of the station is occupied, nothing can be returned there.
    #[error("Station {station_id} has no free slot")]
    StationFull { station_id: i32 },

    #[error("Transaction {transaction_id} is {status}, cannot {operation}")]
    InvalidTransition {
        transaction_id: i32,
        status: TransactionStatus,
        operation: &'static str,
    },

    /// Station counter and powerbank rows disagree. Never repaired automatically.
    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Station lock at {address} unreachable: {reason}")]
    HardwareUnreachable { address: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Whether the operation may succeed if retried later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::Gateway(_)
                | DomainError::HardwareUnreachable { .. }
                | DomainError::Database(_)
        )
    }

    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

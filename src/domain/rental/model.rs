//! Rental transaction entity and its lifecycle state machine
//!
//! ```text
//! Pending --settle_success (unit reserved)--> Ongoing --return_at--> Returned
//!    |  \--settle_success (no inventory)--> Failed
//!    \-----settle_failure-----------------> Failed
//! ```
//!
//! The immediate-rental flow creates a transaction directly in `Ongoing`.
//! `Returned` and `Failed` are terminal.

use chrono::{DateTime, Utc};

/// Rental transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Waiting for payment confirmation
    Pending,
    /// Powerbank is with the user
    Ongoing,
    /// Powerbank docked back at a station
    Returned,
    /// Payment denied/expired/cancelled, or no unit left when payment cleared
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ongoing => "Ongoing",
            Self::Returned => "Returned",
            Self::Failed => "Failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Ongoing" => Some(Self::Ongoing),
            "Returned" => Some(Self::Returned),
            "Failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Every edge of the lifecycle graph. Anything else is rejected.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Ongoing)
                | (Self::Pending, Self::Failed)
                | (Self::Ongoing, Self::Returned)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rental transaction (ledger row)
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: String,
    /// Assigned when a unit is reserved
    pub powerbank_id: Option<i32>,
    pub origin_station_id: i32,
    /// Set on return
    pub return_station_id: Option<i32>,
    pub status: TransactionStatus,
    /// External payment reference; `None` for the immediate flow
    pub order_id: Option<String>,
    pub payment_token: Option<String>,
    pub payment_redirect_url: Option<String>,
    /// Charged amount in the gateway currency's smallest unit
    pub amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == TransactionStatus::Ongoing
    }

    /// Station whose lock a re-open request targets: the origin while the
    /// rental is ongoing, the return station once returned.
    pub fn lock_station_id(&self) -> Option<i32> {
        match self.status {
            TransactionStatus::Ongoing => Some(self.origin_station_id),
            TransactionStatus::Returned => self.return_station_id,
            TransactionStatus::Pending | TransactionStatus::Failed => None,
        }
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Input for the payment-gated flow
#[derive(Debug, Clone)]
pub struct NewPendingRental {
    pub user_id: String,
    pub origin_station_id: i32,
    pub order_id: String,
    pub payment_token: Option<String>,
    pub payment_redirect_url: Option<String>,
    pub amount: Option<i64>,
}

/// Outcome of a settlement call.
///
/// `transitioned` is true only for the call that actually moved the
/// transaction out of `Pending`; repeated calls observe the stored state.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub transaction: Transaction,
    pub transitioned: bool,
}

impl Settlement {
    pub fn applied(transaction: Transaction) -> Self {
        Self {
            transaction,
            transitioned: true,
        }
    }

    pub fn unchanged(transaction: Transaction) -> Self {
        Self {
            transaction,
            transitioned: false,
        }
    }

    /// True when this call moved the rental to `Ongoing`, i.e. the station
    /// lock has to be opened.
    pub fn started_rental(&self) -> bool {
        self.transitioned && self.transaction.is_ongoing()
    }
}

//! Payment gateway status and its mapping onto the rental lifecycle

/// Transaction status as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Expire,
    Cancel,
    /// Anything the mapping does not know about (`authorize`, `refund`, ...)
    Other(String),
}

impl GatewayStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "deny" => Self::Deny,
            "expire" => Self::Expire,
            "cancel" => Self::Cancel,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn outcome(&self) -> PaymentOutcome {
        match self {
            Self::Capture | Self::Settlement => PaymentOutcome::Paid,
            Self::Deny | Self::Expire | Self::Cancel => PaymentOutcome::Failed,
            Self::Pending | Self::Other(_) => PaymentOutcome::Pending,
        }
    }
}

impl std::fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capture => write!(f, "capture"),
            Self::Settlement => write!(f, "settlement"),
            Self::Pending => write!(f, "pending"),
            Self::Deny => write!(f, "deny"),
            Self::Expire => write!(f, "expire"),
            Self::Cancel => write!(f, "cancel"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// What a gateway status means for the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
    /// No mutation
    Pending,
}

impl PaymentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

/// Answer to a client poll. `Failed` is permanent; gateway trouble is
/// always reported as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Success { transaction_id: i32 },
    Failed,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success { .. } => "success",
            Self::Failed => "failed",
        }
    }
}

/// Charge request sent to the gateway.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: String,
    /// Smallest currency unit
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    /// Shown on the payment page
    pub item_id: String,
    pub item_name: String,
}

/// Gateway-side session for a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

/// Returned to the client after a pending rental was created.
#[derive(Debug, Clone)]
pub struct PaymentHandle {
    pub transaction_id: i32,
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_statuses() {
        assert_eq!(GatewayStatus::parse("capture").outcome(), PaymentOutcome::Paid);
        assert_eq!(GatewayStatus::parse("settlement").outcome(), PaymentOutcome::Paid);
    }

    #[test]
    fn failed_statuses() {
        for s in ["deny", "expire", "cancel"] {
            assert_eq!(GatewayStatus::parse(s).outcome(), PaymentOutcome::Failed, "{s}");
        }
    }

    #[test]
    fn everything_else_is_pending() {
        for s in ["pending", "authorize", "refund", ""] {
            assert_eq!(GatewayStatus::parse(s).outcome(), PaymentOutcome::Pending, "{s}");
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(GatewayStatus::parse(" Settlement "), GatewayStatus::Settlement);
        assert_eq!(
            GatewayStatus::parse("authorize"),
            GatewayStatus::Other("authorize".into())
        );
    }

    #[test]
    fn poll_status_strings() {
        assert_eq!(PollStatus::Pending.as_str(), "pending");
        assert_eq!(PollStatus::Success { transaction_id: 3 }.as_str(), "success");
        assert_eq!(PollStatus::Failed.as_str(), "failed");
    }
}

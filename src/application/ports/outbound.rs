//! Outbound ports: the external collaborators the rental core talks to
//!
//! [`PaymentGateway`] creates payment sessions and reports their status.
//! [`LockHardware`] sends a single command to a station lock controller.
//! Production implementations live in `infrastructure::payment` and
//! `infrastructure::hardware`; both are injected as `Arc<dyn _>` at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::{GatewayStatus, PaymentRequest, PaymentSession};
use crate::domain::DomainError;

// ── Payment gateway ────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("gateway answered {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

impl From<GatewayError> for DomainError {
    fn from(e: GatewayError) -> Self {
        DomainError::Gateway(e.to_string())
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for `request.order_id`.
    async fn create_payment(&self, request: &PaymentRequest)
        -> Result<PaymentSession, GatewayError>;

    /// Current status of `order_id` as known by the gateway.
    async fn query_status(&self, order_id: &str) -> Result<GatewayStatus, GatewayError>;
}

// ── Station lock hardware ──────────────────────────────────────

/// Command understood by the lock controller (`GET /{action}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    Open,
    Close,
}

impl LockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

impl std::fmt::Display for LockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("no answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("station returned status {0}")]
    Status(u16),

    #[error("unknown command: {0}")]
    UnknownCommand(LockAction),
}

impl HardwareError {
    /// A rejected command will be rejected again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UnknownCommand(_))
    }
}

#[async_trait]
pub trait LockHardware: Send + Sync {
    async fn trigger(&self, address: &str, action: LockAction) -> Result<(), HardwareError>;
}

//! Payment reconciliation types

pub mod model;

pub use model::{
    GatewayStatus, PaymentHandle, PaymentOutcome, PaymentRequest, PaymentSession, PollStatus,
};

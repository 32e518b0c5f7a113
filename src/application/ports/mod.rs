//! Application ports (hexagonal architecture boundaries)
//!
//! Outbound ports for the payment gateway and the station lock hardware.

pub mod outbound;

pub use outbound::{GatewayError, HardwareError, LockAction, LockHardware, PaymentGateway};

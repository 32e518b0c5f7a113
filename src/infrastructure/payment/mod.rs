//! Payment gateway adapters

pub mod midtrans;

pub use midtrans::{MidtransConfig, MidtransGateway};

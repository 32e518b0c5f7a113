pub mod ports;
pub mod services;

// Re-export key types for convenience
pub use ports::{GatewayError, HardwareError, LockAction, LockHardware, PaymentGateway};
pub use services::{
    LockDispatchConfig, LockDispatcher, PaymentService, PaymentSettings, RentalService,
};

//! Application services

mod lock_dispatcher;
mod payment;
mod rental;

pub use lock_dispatcher::{LockDispatchConfig, LockDispatcher};
pub use payment::{generate_order_id, PaymentService, PaymentSettings};
pub use rental::RentalService;

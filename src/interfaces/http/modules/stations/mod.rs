//! Station module: map listings and inventory audit

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

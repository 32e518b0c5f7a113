//! Payment module: Snap payment creation, status poll, gateway webhook

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

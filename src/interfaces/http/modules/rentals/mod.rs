//! Rental module: start, return, history, lock re-open

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

//! REST API modules, one per resource

pub mod auth;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod rentals;
pub mod request_id;
pub mod stations;

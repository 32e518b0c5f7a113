//! # Powerbank Rental
//!
//! Rental lifecycle coordinator for a power-bank sharing service: rent a
//! unit at one station, pay for it, return it at any station with a free
//! slot.
//!
//! ## Architecture
//!
//! - **domain**: entities, lifecycle rules and repository traits
//! - **application**: rental and payment services, lock dispatch, outbound ports
//! - **infrastructure**: SeaORM persistence, Midtrans client, ESP32 lock client, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: startup and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;

pub use server::{init_tracing, ServerHandle, ServerOptions};

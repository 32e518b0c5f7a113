//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validating extractor
//! - `middleware`: bearer token authentication
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDependencies, ApiDoc};

//! Station aggregate

pub mod model;
pub mod repository;

pub use model::{Station, StationInventory};
pub use repository::StationRepository;

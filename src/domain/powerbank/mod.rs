//! Powerbank aggregate

pub mod model;
pub mod repository;

pub use model::{Powerbank, PowerbankStatus};
pub use repository::PowerbankRepository;

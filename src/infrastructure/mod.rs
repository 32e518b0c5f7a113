//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod hardware;
pub mod payment;

pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{init_database, DatabaseConfig};
pub use hardware::{HttpLockHardware, SimulatedLockHardware};
pub use payment::{MidtransConfig, MidtransGateway};

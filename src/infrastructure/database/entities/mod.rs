//! Database entities module

pub mod powerbank;
pub mod station;
pub mod transaction;
pub mod user;

pub use powerbank::Entity as Powerbank;
pub use station::Entity as Station;
pub use transaction::Entity as Transaction;
pub use user::Entity as User;

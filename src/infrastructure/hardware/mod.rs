//! Station lock hardware adapters

pub mod esp32;

pub use esp32::{HttpLockHardware, SimulatedLockHardware};

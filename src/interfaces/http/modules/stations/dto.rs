//! Station DTOs

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Station, StationInventory};

/// Map marker for one station. The lock controller address stays internal.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationDto {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: i32,
    pub powerbank_left: i32,
    pub free_slots: i32,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        Self {
            free_slots: s.free_slots(),
            id: s.id,
            name: s.name,
            latitude: s.latitude,
            longitude: s.longitude,
            capacity: s.capacity,
            powerbank_left: s.powerbank_left,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryDto {
    pub station_id: i32,
    pub capacity: i32,
    pub powerbank_left: i32,
    /// Powerbank rows marked available at the station
    pub available_rows: i32,
    pub consistent: bool,
}

impl From<StationInventory> for InventoryDto {
    fn from(i: StationInventory) -> Self {
        Self {
            consistent: i.is_consistent(),
            station_id: i.station_id,
            capacity: i.capacity,
            powerbank_left: i.powerbank_left,
            available_rows: i.available_rows,
        }
    }
}

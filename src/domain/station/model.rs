//! Powerbank station domain entity

/// Physical dock holding powerbanks.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Number of slots
    pub capacity: i32,
    /// Available powerbanks, `0..=capacity`
    pub powerbank_left: i32,
    /// Network address of the lock controller (`host[:port]`)
    pub address: String,
}

impl Station {
    pub fn has_available(&self) -> bool {
        self.powerbank_left > 0
    }

    pub fn has_free_slot(&self) -> bool {
        self.powerbank_left < self.capacity
    }

    pub fn free_slots(&self) -> i32 {
        self.capacity - self.powerbank_left
    }
}

/// Counter-vs-rows comparison for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInventory {
    pub station_id: i32,
    pub capacity: i32,
    pub powerbank_left: i32,
    /// Powerbank rows with `status = Available` docked at this station
    pub available_rows: i32,
}

impl StationInventory {
    pub fn is_consistent(&self) -> bool {
        self.powerbank_left == self.available_rows
            && self.powerbank_left >= 0
            && self.powerbank_left <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(capacity: i32, left: i32) -> Station {
        Station {
            id: 1,
            name: "Kantin Pusat".into(),
            latitude: -7.28,
            longitude: 112.79,
            capacity,
            powerbank_left: left,
            address: "192.168.1.50".into(),
        }
    }

    #[test]
    fn availability_flags() {
        assert!(station(10, 5).has_available());
        assert!(station(10, 5).has_free_slot());
        assert!(!station(10, 0).has_available());
        assert!(!station(8, 8).has_free_slot());
        assert_eq!(station(8, 3).free_slots(), 5);
    }

    #[test]
    fn inventory_consistency() {
        let ok = StationInventory {
            station_id: 1,
            capacity: 10,
            powerbank_left: 5,
            available_rows: 5,
        };
        assert!(ok.is_consistent());

        let drifted = StationInventory {
            available_rows: 2,
            ..ok
        };
        assert!(!drifted.is_consistent());
    }
}

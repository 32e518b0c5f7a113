//! Powerbank domain entity

/// Physical state of a powerbank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerbankStatus {
    /// Docked at a station and rentable
    Available,
    /// With a user, not docked anywhere
    Rented,
}

impl PowerbankStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Rented => "Rented",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(Self::Available),
            "Rented" => Some(Self::Rented),
            _ => None,
        }
    }
}

impl std::fmt::Display for PowerbankStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Powerbank {
    pub id: i32,
    /// Unique label printed on the unit, e.g. `PB-001`
    pub code: String,
    /// Battery capacity in mAh
    pub capacity_mah: i32,
    pub status: PowerbankStatus,
    /// Set iff `status == Available`
    pub current_station_id: Option<i32>,
}

impl Powerbank {
    /// A docked unit has a station and is available; a rented unit has neither.
    pub fn is_well_formed(&self) -> bool {
        match self.status {
            PowerbankStatus::Available => self.current_station_id.is_some(),
            PowerbankStatus::Rented => self.current_station_id.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!(
            PowerbankStatus::from_str("Available"),
            Some(PowerbankStatus::Available)
        );
        assert_eq!(PowerbankStatus::from_str("Rented"), Some(PowerbankStatus::Rented));
        assert_eq!(PowerbankStatus::from_str("rented"), None);
    }

    #[test]
    fn station_presence_follows_status() {
        let mut pb = Powerbank {
            id: 1,
            code: "PB-001".into(),
            capacity_mah: 10_000,
            status: PowerbankStatus::Available,
            current_station_id: Some(1),
        };
        assert!(pb.is_well_formed());

        pb.status = PowerbankStatus::Rented;
        assert!(!pb.is_well_formed());

        pb.current_station_id = None;
        assert!(pb.is_well_formed());
    }
}

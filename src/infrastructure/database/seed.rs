//! Demo data for a fresh database

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
    TransactionTrait,
};
use tracing::info;

use super::entities::{powerbank, station};
use crate::domain::powerbank::PowerbankStatus;
use crate::domain::DomainResult;
use crate::infrastructure::database::repositories::db_err;

/// Capacity of every seeded powerbank
const SEED_CAPACITY_MAH: i32 = 10_000;

/// A station together with the units docked in it.
#[derive(Debug, Clone)]
pub struct StationSeed {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: i32,
    /// Docked units, also the initial counter value
    pub units: i32,
    pub address: String,
}

/// The two campus stations used for demos.
pub fn demo_stations(address: &str) -> Vec<StationSeed> {
    vec![
        StationSeed {
            name: "Kantin Pusat ITS".to_string(),
            latitude: -7.2839100,
            longitude: 112.7940321,
            capacity: 10,
            units: 5,
            address: address.to_string(),
        },
        StationSeed {
            name: "Tower 2 ITS".to_string(),
            latitude: -7.2851831,
            longitude: 112.7952606,
            capacity: 8,
            units: 3,
            address: address.to_string(),
        },
    ]
}

/// Insert a station and its units. Units are labelled `PB-{n:03}` starting
/// at `first_code`. Returns the station id.
pub async fn insert_station<C: ConnectionTrait>(
    conn: &C,
    seed: &StationSeed,
    first_code: i32,
) -> DomainResult<i32> {
    let now = Utc::now();
    let inserted = station::ActiveModel {
        name: Set(seed.name.clone()),
        latitude: Set(seed.latitude),
        longitude: Set(seed.longitude),
        capacity: Set(seed.capacity),
        powerbank_left: Set(seed.units),
        address: Set(seed.address.clone()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err)?;

    for n in first_code..first_code + seed.units {
        powerbank::ActiveModel {
            code: Set(format!("PB-{:03}", n)),
            capacity_mah: Set(SEED_CAPACITY_MAH),
            status: Set(PowerbankStatus::Available.as_str().to_string()),
            current_station_id: Set(Some(inserted.id)),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err)?;
    }

    Ok(inserted.id)
}

/// Seed the demo stations when the database has none. Returns whether
/// anything was inserted.
pub async fn seed_demo_data(db: &DatabaseConnection, address: &str) -> DomainResult<bool> {
    let existing = station::Entity::find().count(db).await.map_err(db_err)?;
    if existing > 0 {
        info!(stations = existing, "Stations present, skipping demo seed");
        return Ok(false);
    }

    let txn = db.begin().await.map_err(db_err)?;
    let mut next_code = 1;
    for seed in demo_stations(address) {
        let id = insert_station(&txn, &seed, next_code).await?;
        info!(station_id = id, name = %seed.name, units = seed.units, "Seeded station");
        next_code += seed.units;
    }
    txn.commit().await.map_err(db_err)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::station::StationRepository;
    use crate::infrastructure::database::repositories::SeaOrmStationRepository;
    use crate::infrastructure::database::test_database;

    #[tokio::test]
    async fn demo_seed_is_consistent_and_runs_once() {
        let db = test_database().await;
        assert!(seed_demo_data(&db, "192.168.1.50").await.unwrap());
        assert!(!seed_demo_data(&db, "192.168.1.50").await.unwrap());

        let repo = SeaOrmStationRepository::new(db);
        let report = repo.inventory_report().await.unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|row| row.is_consistent()));
        assert_eq!(report[0].available_rows, 5);
        assert_eq!(report[1].available_rows, 3);
    }

    #[tokio::test]
    async fn listings_follow_counters() {
        let db = test_database().await;
        let mut full = demo_stations("10.0.0.9").remove(1);
        full.name = "Full".into();
        full.capacity = 2;
        full.units = 2;
        let mut empty = full.clone();
        empty.name = "Empty".into();
        empty.units = 0;

        let full_id = insert_station(&db, &full, 1).await.unwrap();
        let empty_id = insert_station(&db, &empty, 10).await.unwrap();

        let repo = SeaOrmStationRepository::new(db);
        let available: Vec<i32> = repo.find_available().await.unwrap().iter().map(|s| s.id).collect();
        let returnable: Vec<i32> = repo.find_returnable().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(available, vec![full_id]);
        assert_eq!(returnable, vec![empty_id]);
    }
}

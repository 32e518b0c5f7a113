//! Shared fixtures: an in-memory database with two stations, a scriptable
//! payment gateway and a lock controller that records every command.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use powerbank_rental::application::{
    GatewayError, HardwareError, LockAction, LockDispatchConfig, LockDispatcher, LockHardware,
    PaymentGateway, PaymentService, PaymentSettings, RentalService,
};
use powerbank_rental::domain::payment::{GatewayStatus, PaymentRequest, PaymentSession};
use powerbank_rental::domain::powerbank::PowerbankRepository;
use powerbank_rental::domain::rental::{RentalLedger, TransactionRepository};
use powerbank_rental::domain::station::StationRepository;
use powerbank_rental::domain::user::UserRepository;
use powerbank_rental::domain::{
    DomainError, DomainResult, NewUser, RepositoryProvider, Station, StationInventory,
};
use powerbank_rental::infrastructure::database::migrator::Migrator;
use powerbank_rental::infrastructure::database::seed::{insert_station, StationSeed};
use powerbank_rental::shared::utils::RetryConfig;
use powerbank_rental::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub const ADDRESS_A: &str = "10.0.0.1";
pub const ADDRESS_B: &str = "10.0.0.2";

/// Answers status queries from a script; the last entry repeats.
pub struct FakeGateway {
    statuses: Mutex<VecDeque<GatewayStatus>>,
    failing: AtomicBool,
    pub created: Mutex<Vec<PaymentRequest>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(VecDeque::from([GatewayStatus::Pending])),
            failing: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn answer(&self, status: GatewayStatus) {
        *self.statuses.lock().unwrap() = VecDeque::from([status]);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(PaymentSession {
            token: format!("snap-{}", request.order_id),
            redirect_url: format!("https://app.sandbox.test/snap/{}", request.order_id),
        })
    }

    async fn query_status(&self, _order_id: &str) -> Result<GatewayStatus, GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or(GatewayStatus::Pending))
    }
}

/// Records `(address, action)` for every command; can be told to fail.
pub struct RecordingHardware {
    pub calls: Mutex<Vec<(String, LockAction)>>,
    failing: AtomicBool,
}

impl RecordingHardware {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn opened(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, action)| *action == LockAction::Open)
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Wait until `n` open commands were attempted. Dispatch runs on a
    /// spawned task, so tests have to give it a moment.
    pub async fn wait_for_opens(&self, n: usize) -> Vec<String> {
        for _ in 0..100 {
            let opened = self.opened();
            if opened.len() >= n {
                return opened;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.opened()
    }
}

#[async_trait]
impl LockHardware for RecordingHardware {
    async fn trigger(&self, address: &str, action: LockAction) -> Result<(), HardwareError> {
        self.calls.lock().unwrap().push((address.to_string(), action));
        if self.failing.load(Ordering::SeqCst) {
            Err(HardwareError::Connection("no route to host".into()))
        } else {
            Ok(())
        }
    }
}

/// Station reads that can be switched to fail; everything else is the real
/// store.
pub struct SwitchableStations {
    repos: Arc<SeaOrmRepositoryProvider>,
    down: AtomicBool,
}

impl SwitchableStations {
    fn check(&self) -> DomainResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(DomainError::Database("database is locked".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StationRepository for SwitchableStations {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        self.check()?;
        self.repos.stations().find_by_id(id).await
    }

    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        self.check()?;
        self.repos.stations().find_all().await
    }

    async fn find_available(&self) -> DomainResult<Vec<Station>> {
        self.check()?;
        self.repos.stations().find_available().await
    }

    async fn find_returnable(&self) -> DomainResult<Vec<Station>> {
        self.check()?;
        self.repos.stations().find_returnable().await
    }

    async fn inventory_report(&self) -> DomainResult<Vec<StationInventory>> {
        self.check()?;
        self.repos.stations().inventory_report().await
    }
}

pub struct HarnessRepos {
    repos: Arc<SeaOrmRepositoryProvider>,
    pub stations: SwitchableStations,
}

impl RepositoryProvider for HarnessRepos {
    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn powerbanks(&self) -> &dyn PowerbankRepository {
        self.repos.powerbanks()
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        self.repos.transactions()
    }

    fn users(&self) -> &dyn UserRepository {
        self.repos.users()
    }

    fn ledger(&self) -> &dyn RentalLedger {
        self.repos.ledger()
    }
}

pub struct Harness {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    store: Arc<HarnessRepos>,
    pub rentals: Arc<RentalService>,
    pub payments: Arc<PaymentService>,
    pub gateway: Arc<FakeGateway>,
    pub hardware: Arc<RecordingHardware>,
    /// Station A: capacity 10, 5 units
    pub station_a: i32,
    /// Station B: capacity 8, 3 units
    pub station_b: i32,
}

fn station(name: &str, capacity: i32, units: i32, address: &str) -> StationSeed {
    StationSeed {
        name: name.to_string(),
        latitude: -7.28,
        longitude: 112.79,
        capacity,
        units,
        address: address.to_string(),
    }
}

impl Harness {
    pub async fn new() -> Self {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let station_a = insert_station(&db, &station("A", 10, 5, ADDRESS_A), 1)
            .await
            .unwrap();
        let station_b = insert_station(&db, &station("B", 8, 3, ADDRESS_B), 100)
            .await
            .unwrap();

        let sea_orm = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let store = Arc::new(HarnessRepos {
            repos: sea_orm.clone(),
            stations: SwitchableStations {
                repos: sea_orm,
                down: AtomicBool::new(false),
            },
        });
        let repos: Arc<dyn RepositoryProvider> = store.clone();
        let gateway = FakeGateway::new();
        let hardware = RecordingHardware::new();
        let locks = Arc::new(LockDispatcher::new(
            hardware.clone(),
            RecordingHardware::new(),
            LockDispatchConfig {
                timeout: Duration::from_millis(200),
                simulated_addresses: Default::default(),
                retry: RetryConfig {
                    max_attempts: 1,
                    initial_delay: Duration::from_millis(1),
                    ..RetryConfig::default()
                },
            },
        ));

        Self {
            rentals: Arc::new(RentalService::new(repos.clone(), locks.clone())),
            payments: Arc::new(PaymentService::new(
                repos.clone(),
                gateway.clone(),
                locks,
                PaymentSettings {
                    rental_price: 10_000,
                    client_key: "SB-client".into(),
                },
            )),
            db,
            repos,
            store,
            gateway,
            hardware,
            station_a,
            station_b,
        }
    }

    /// Make every station read fail until switched back.
    pub fn set_station_reads_failing(&self, failing: bool) {
        self.store.stations.down.store(failing, Ordering::SeqCst);
    }

    pub async fn user(&self, username: &str) -> String {
        self.repos
            .users()
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    /// Add a station with `units` docked powerbanks and no other stock.
    pub async fn add_station(&self, name: &str, capacity: i32, units: i32, first_code: i32) -> i32 {
        insert_station(&self.db, &station(name, capacity, units, ADDRESS_A), first_code)
            .await
            .unwrap()
    }

    pub async fn left(&self, station_id: i32) -> i32 {
        self.repos
            .stations()
            .find_by_id(station_id)
            .await
            .unwrap()
            .unwrap()
            .powerbank_left
    }

    pub async fn inventory(&self) -> Vec<StationInventory> {
        self.repos.stations().inventory_report().await.unwrap()
    }

    /// Every station counter matches its available powerbank rows and every
    /// docked unit is well formed.
    pub async fn assert_consistent(&self) {
        for station in self.inventory().await {
            assert!(station.is_consistent(), "{station:?}");
            let docked = self
                .repos
                .powerbanks()
                .find_at_station(station.station_id)
                .await
                .unwrap();
            for unit in docked {
                assert!(unit.is_well_formed(), "{unit:?}");
            }
        }
    }
}

//! Lock Dispatcher
//!
//! Sends `open` commands to station locks after a ledger transition has
//! committed. Dispatch results are logged and counted, never fed back into
//! the ledger.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::ports::{HardwareError, LockAction, LockHardware};
use crate::domain::station::StationRepository;
use crate::domain::DomainError;
use crate::shared::utils::{retry_with_backoff, RetryConfig};

/// Configuration for lock dispatch
#[derive(Debug, Clone)]
pub struct LockDispatchConfig {
    /// Upper bound for one attempt against a controller
    pub timeout: Duration,
    /// Addresses served by the simulated controller
    pub simulated_addresses: HashSet<String>,
    pub retry: RetryConfig,
}

impl Default for LockDispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            simulated_addresses: HashSet::from(["192.168.1.50".to_string()]),
            retry: RetryConfig::default(),
        }
    }
}

pub struct LockDispatcher {
    hardware: Arc<dyn LockHardware>,
    simulated: Arc<dyn LockHardware>,
    config: LockDispatchConfig,
}

impl LockDispatcher {
    pub fn new(
        hardware: Arc<dyn LockHardware>,
        simulated: Arc<dyn LockHardware>,
        config: LockDispatchConfig,
    ) -> Self {
        Self {
            hardware,
            simulated,
            config,
        }
    }

    pub fn is_simulated(&self, address: &str) -> bool {
        self.config.simulated_addresses.contains(address)
    }

    fn controller_for(&self, address: &str) -> Arc<dyn LockHardware> {
        if self.is_simulated(address) {
            self.simulated.clone()
        } else {
            self.hardware.clone()
        }
    }

    /// Open the lock at `address`, retrying transient failures. Each attempt
    /// is bounded by the configured timeout.
    pub async fn open(&self, address: &str) -> Result<(), DomainError> {
        self.open_with(address, &self.config.retry).await
    }

    async fn open_with(&self, address: &str, retry: &RetryConfig) -> Result<(), DomainError> {
        let controller = self.controller_for(address);
        let timeout = self.config.timeout;

        let result = retry_with_backoff(
            retry,
            || {
                let controller = controller.clone();
                async move {
                    match tokio::time::timeout(timeout, controller.trigger(address, LockAction::Open))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(HardwareError::Timeout(timeout)),
                    }
                }
            },
            HardwareError::is_retryable,
            "lock_open",
        )
        .await;

        result.map_err(|e| {
            metrics::counter!("lock_dispatch_failures_total").increment(1);
            DomainError::HardwareUnreachable {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Fire-and-forget open. The returned handle resolves once the attempt
    /// has finished; callers usually drop it.
    pub fn dispatch_open(self: &Arc<Self>, address: &str) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        let address = address.to_string();
        tokio::spawn(async move {
            match dispatcher.open(&address).await {
                Ok(()) => info!(address = %address, "Station lock opened"),
                Err(e) => warn!(address = %address, error = %e, "Station lock dispatch failed"),
            }
        })
    }

    /// Fire-and-forget open for the lock of `station_id`. Runs after a
    /// committed ledger unit, so a failed address lookup only skips the
    /// command.
    pub async fn dispatch_open_at(
        self: &Arc<Self>,
        stations: &dyn StationRepository,
        station_id: i32,
    ) -> Option<JoinHandle<()>> {
        match stations.find_by_id(station_id).await {
            Ok(Some(station)) => Some(self.dispatch_open(&station.address)),
            Ok(None) => {
                metrics::counter!("lock_dispatch_failures_total").increment(1);
                warn!(station_id, "Station not found, lock not opened");
                None
            }
            Err(e) => {
                metrics::counter!("lock_dispatch_failures_total").increment(1);
                warn!(station_id, error = %e, "Station lookup failed, lock not opened");
                None
            }
        }
    }

    /// Manual re-open requested by the user. Same command, awaited so the
    /// outcome can be shown. A single attempt, so the caller waits at most
    /// one timeout.
    pub async fn retry_open(&self, address: &str) -> Result<(), DomainError> {
        info!(address, "Manual lock re-open");
        self.open_with(address, &RetryConfig::once()).await
    }
}

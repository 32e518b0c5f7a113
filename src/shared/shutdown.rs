//! Graceful shutdown handling
//!
//! A cloneable [`ShutdownSignal`] shared by the REST server and background
//! tasks, triggered by SIGTERM / SIGINT or programmatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("🛑 Shutdown signal triggered");
            let _ = self.sender.send(());
        }
    }

    /// Resolves once shutdown has been triggered, including when it was
    /// triggered before this call.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for SIGTERM / SIGINT and trigger `shutdown`.
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("📡 Received SIGTERM signal"),
            _ = sigint.recv() => info!("📡 Received SIGINT signal (Ctrl+C)"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("📡 Received Ctrl+C signal");
    }

    shutdown.trigger();
}

/// Owns the process-wide shutdown signal and the grace period.
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout_secs: u64,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout_secs,
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_shutdown_signals(signal).await;
        });
    }

    /// Run `cleanup` bounded by the grace period. Returns `false` on timeout.
    pub async fn run_cleanup<Fut>(&self, cleanup: Fut) -> bool
    where
        Fut: std::future::Future<Output = ()>,
    {
        info!(
            "⏳ Starting graceful shutdown (timeout: {}s)...",
            self.timeout_secs
        );
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), cleanup).await {
            Ok(()) => {
                info!("✅ Graceful shutdown completed");
                true
            }
            Err(_) => {
                warn!("⚠️ Graceful shutdown timed out after {}s", self.timeout_secs);
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}

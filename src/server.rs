//! Powerbank rental server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database, schema, demo seed,
//! payment and lock clients, the REST API and graceful shutdown. The CLI
//! binary is a thin wrapper around it.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::services::{LockDispatcher, PaymentService, RentalService};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::seed::seed_demo_data;
use crate::infrastructure::{
    init_database, HttpLockHardware, MidtransGateway, SeaOrmRepositoryProvider,
    SimulatedLockHardware,
};
use crate::interfaces::http::modules::metrics::prometheus_handle;
use crate::interfaces::http::{create_api_router, ApiDependencies};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub struct ServerOptions {
    pub config: AppConfig,
    /// Create or update the schema on startup (default: true).
    pub auto_migrate: bool,
    /// Seed the demo stations into an empty database (default: from config).
    pub seed_demo_data: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            seed_demo_data: config.seed.demo_data,
            config,
            auto_migrate: true,
        }
    }
}

/// Handle to a running rental service.
///
/// ```rust,no_run
/// use powerbank_rental::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub rentals: Arc<RentalService>,
    pub payments: Arc<PaymentService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the REST API listens on (resolved when port 0 was requested).
    pub port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting powerbank rental service...");

        let metrics = prometheus_handle();

        let db_config = app_cfg.database.connection();
        info!(url = %db_config.url, "Connecting to database");
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        if opts.seed_demo_data && seed_demo_data(&db, app_cfg.hardware.demo_address()).await? {
            info!(address = app_cfg.hardware.demo_address(), "Demo stations seeded");
        }

        // ── Repositories & collaborators ───────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if app_cfg.payment.server_key.is_empty() {
            warn!("payment.server_key is empty, gateway calls will be rejected");
        }
        let gateway = Arc::new(MidtransGateway::new(app_cfg.payment.midtrans())?);

        let hardware = Arc::new(HttpLockHardware::new(app_cfg.hardware.timeout())?);
        let simulated = Arc::new(SimulatedLockHardware::new(
            Duration::from_millis(app_cfg.hardware.simulated_latency_ms),
            Duration::from_secs(app_cfg.hardware.auto_close_secs),
        ));
        let locks = Arc::new(LockDispatcher::new(
            hardware,
            simulated,
            app_cfg.hardware.dispatch(),
        ));

        // ── Services ───────────────────────────────────────────
        let rentals = Arc::new(RentalService::new(repos.clone(), locks.clone()));
        let payments = Arc::new(PaymentService::new(
            repos.clone(),
            gateway,
            locks,
            app_cfg.payment.settings(),
        ));

        let jwt_config = app_cfg.security.jwt();
        info!(
            expiration_hours = jwt_config.expiration_hours,
            "JWT configured"
        );

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── REST API ───────────────────────────────────────────
        let router = create_api_router(ApiDependencies {
            db: db.clone(),
            repos: repos.clone(),
            rentals: rentals.clone(),
            payments: payments.clone(),
            jwt_config,
            metrics,
        });

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos,
            rentals,
            payments,
            config: app_cfg,
            port: local_addr.port(),
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGINT / SIGTERM.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API to drain after shutdown was triggered, bounded by
    /// `server.shutdown_timeout`, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .run_cleanup(async move {
                match api_task.await {
                    Ok(()) => info!("REST API stopped"),
                    Err(e) => error!("REST API task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Powerbank rental service stopped");
    }

    pub async fn shutdown(self) {
        info!("Shutting down powerbank rental service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `logging.level`.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

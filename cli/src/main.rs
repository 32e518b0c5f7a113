//! Powerbank rental service, CLI server
//!
//! ```sh
//! # Run with default config (~/.config/powerbank-rental/config.toml)
//! powerbank-service
//!
//! # Custom config path and port
//! powerbank-service --config /etc/powerbank-rental/config.toml --port 9000
//!
//! # Validate config without starting
//! powerbank-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use powerbank_rental::config::AppConfig;
use powerbank_rental::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "powerbank-service",
    version,
    about = "Powerbank rental service",
    long_about = "REST API for renting powerbanks from stations, paying through Midtrans \
                  and returning them to any station with a free slot.\n\n\
                  Default config: ~/.config/powerbank-rental/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "POWERBANK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Do not seed demo stations into an empty database.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(powerbank_rental::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Rental price: {}", config.payment.rental_price);
        println!(
            "   Simulated   : {}",
            config.hardware.simulated_addresses.join(", ")
        );
        return Ok(());
    }

    let seed_demo_data = config.seed.demo_data && !cli.no_seed;
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed_demo_data,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

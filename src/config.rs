//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/powerbank-rental/config.toml`).
//! A missing file yields defaults; a handful of secrets can be supplied
//! through the environment instead of the file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::services::{LockDispatchConfig, PaymentSettings};
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::payment::midtrans::{MidtransConfig, SANDBOX_API_URL, SANDBOX_SNAP_URL};
use crate::infrastructure::DatabaseConfig;
use crate::shared::utils::RetryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("powerbank-rental")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub payment: PaymentConfig,
    pub hardware: HardwareConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds granted to in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

impl DatabaseSettings {
    pub fn connection(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error (or a full filter directive)
    pub level: String,
    /// "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let defaults = JwtConfig::default();
        Self {
            jwt_secret: defaults.secret,
            jwt_expiration_hours: defaults.expiration_hours,
        }
    }
}

impl SecurityConfig {
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_expiration_hours)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub server_key: String,
    pub client_key: String,
    pub snap_base_url: String,
    pub api_base_url: String,
    /// Price of one rental in the smallest currency unit
    pub rental_price: i64,
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            server_key: String::new(),
            client_key: String::new(),
            snap_base_url: SANDBOX_SNAP_URL.to_string(),
            api_base_url: SANDBOX_API_URL.to_string(),
            rental_price: 10_000,
            timeout_secs: 10,
        }
    }
}

impl PaymentConfig {
    pub fn midtrans(&self) -> MidtransConfig {
        MidtransConfig {
            server_key: self.server_key.clone(),
            snap_base_url: self.snap_base_url.clone(),
            api_base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn settings(&self) -> PaymentSettings {
        PaymentSettings {
            rental_price: self.rental_price,
            client_key: self.client_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Upper bound for one lock command
    pub timeout_secs: u64,
    /// Station addresses served by the simulated lock
    pub simulated_addresses: Vec<String>,
    pub simulated_latency_ms: u64,
    /// How long the simulated lock stays open
    pub auto_close_secs: u64,
    pub retry_attempts: u32,
    pub retry_initial_delay_ms: u64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            simulated_addresses: vec!["192.168.1.50".to_string()],
            simulated_latency_ms: 500,
            auto_close_secs: 10,
            retry_attempts: 3,
            retry_initial_delay_ms: 200,
        }
    }
}

impl HardwareConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn dispatch(&self) -> LockDispatchConfig {
        LockDispatchConfig {
            timeout: self.timeout(),
            simulated_addresses: self.simulated_addresses.iter().cloned().collect::<HashSet<_>>(),
            retry: RetryConfig {
                max_attempts: self.retry_attempts,
                initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
                ..RetryConfig::default()
            },
        }
    }

    /// Address the demo stations are seeded with
    pub fn demo_address(&self) -> &str {
        self.simulated_addresses
            .first()
            .map(String::as_str)
            .unwrap_or("192.168.1.50")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed demo stations into an empty database
    pub demo_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { demo_data: true }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist. Environment overrides are applied last.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `DATABASE_URL`, `JWT_SECRET`, `MIDTRANS_SERVER_KEY` and
    /// `MIDTRANS_CLIENT_KEY` win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(key) = lookup("MIDTRANS_SERVER_KEY") {
            self.payment.server_key = key;
        }
        if let Some(key) = lookup("MIDTRANS_CLIENT_KEY") {
            self.payment.client_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [hardware]
            simulated_addresses = ["10.0.0.5", "10.0.0.6"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.payment.rental_price, 10_000);
        assert_eq!(config.hardware.demo_address(), "10.0.0.5");
        assert!(config.hardware.dispatch().simulated_addresses.contains("10.0.0.6"));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("MIDTRANS_SERVER_KEY", "SB-server"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.payment.server_key, "SB-server");
        assert_eq!(config.payment.client_key, "");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/powerbank/config.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.seed.demo_data);
    }

    #[test]
    fn invalid_file_is_reported() {
        assert!(AppConfig::from_toml("[server]\nport = \"eighty\"").is_err());
    }
}

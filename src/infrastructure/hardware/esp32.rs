//! ESP32 station lock controllers
//!
//! A real controller exposes `GET http://{address}/{action}` and answers 200
//! when the command was accepted. The simulated controller stands in for
//! demo stations without hardware.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::application::ports::{HardwareError, LockAction, LockHardware};

/// HTTP client for real lock controllers.
pub struct HttpLockHardware {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpLockHardware {
    pub fn new(timeout: Duration) -> Result<Self, HardwareError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| HardwareError::Connection(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    fn url(address: &str, action: LockAction) -> String {
        if address.starts_with("http://") || address.starts_with("https://") {
            format!("{}/{}", address.trim_end_matches('/'), action)
        } else {
            format!("http://{}/{}", address, action)
        }
    }
}

#[async_trait]
impl LockHardware for HttpLockHardware {
    async fn trigger(&self, address: &str, action: LockAction) -> Result<(), HardwareError> {
        let url = Self::url(address, action);
        info!(%url, "Sending lock command");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                HardwareError::Timeout(self.timeout)
            } else {
                HardwareError::Connection(e.to_string())
            }
        })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(%url, status = status.as_u16(), "Station rejected lock command");
            return Err(HardwareError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Lock controller double for stations without hardware. Opening holds the
/// lock for `auto_close` and then logs the close.
pub struct SimulatedLockHardware {
    latency: Duration,
    auto_close: Duration,
}

impl SimulatedLockHardware {
    pub fn new(latency: Duration, auto_close: Duration) -> Self {
        Self {
            latency,
            auto_close,
        }
    }
}

#[async_trait]
impl LockHardware for SimulatedLockHardware {
    async fn trigger(&self, address: &str, action: LockAction) -> Result<(), HardwareError> {
        info!(address, "[simulation] connecting");
        tokio::time::sleep(self.latency).await;

        match action {
            LockAction::Open => {
                info!(
                    address,
                    hold_secs = self.auto_close.as_secs(),
                    "[simulation] lock opened"
                );
                let address = address.to_string();
                let hold = self.auto_close;
                tokio::spawn(async move {
                    tokio::time::sleep(hold).await;
                    info!(address = %address, "[simulation] lock auto-closed");
                });
                Ok(())
            }
            other => Err(HardwareError::UnknownCommand(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn address(server: &MockServer) -> String {
        server.address().to_string()
    }

    #[tokio::test]
    async fn open_hits_action_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/open"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let hw = HttpLockHardware::new(Duration::from_secs(2)).unwrap();
        hw.trigger(&address(&server), LockAction::Open).await.unwrap();
    }

    #[tokio::test]
    async fn non_200_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/open"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let hw = HttpLockHardware::new(Duration::from_secs(2)).unwrap();
        let err = hw.trigger(&address(&server), LockAction::Open).await.unwrap_err();
        assert!(matches!(err, HardwareError::Status(503)), "{err}");
    }

    #[tokio::test]
    async fn slow_controller_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/open"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let hw = HttpLockHardware::new(Duration::from_millis(200)).unwrap();
        let err = hw.trigger(&address(&server), LockAction::Open).await.unwrap_err();
        assert!(matches!(err, HardwareError::Timeout(_)), "{err}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn simulated_open_succeeds_and_close_is_unknown() {
        let hw = SimulatedLockHardware::new(Duration::from_millis(1), Duration::from_millis(5));
        hw.trigger("192.168.1.50", LockAction::Open).await.unwrap();

        let err = hw.trigger("192.168.1.50", LockAction::Close).await.unwrap_err();
        assert!(matches!(err, HardwareError::UnknownCommand(LockAction::Close)));
        assert!(!err.is_retryable());
    }
}

//! Midtrans payment gateway client
//!
//! Snap creates the hosted payment page, the Core API reports the status of
//! an order. Both authenticate with the server key as basic-auth user.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{GatewayError, PaymentGateway};
use crate::domain::payment::{GatewayStatus, PaymentRequest, PaymentSession};

pub const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
pub const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub snap_base_url: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            server_key: String::new(),
            snap_base_url: SANDBOX_SNAP_URL.to_string(),
            api_base_url: SANDBOX_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct MidtransGateway {
    http: reqwest::Client,
    config: MidtransConfig,
}

// ── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SnapRequest<'a> {
    transaction_details: TransactionDetails<'a>,
    credit_card: CreditCard,
    customer_details: CustomerDetails<'a>,
    item_details: [ItemDetails<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CreditCard {
    secure: bool,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct ItemDetails<'a> {
    id: &'a str,
    name: &'a str,
    price: i64,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: String,
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status_code: Option<String>,
    status_message: Option<String>,
    transaction_status: Option<String>,
}

impl MidtransGateway {
    pub fn new(config: MidtransConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("powerbank-rental/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn url(base: &str, path: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let body = SnapRequest {
            transaction_details: TransactionDetails {
                order_id: &request.order_id,
                gross_amount: request.amount,
            },
            credit_card: CreditCard { secure: true },
            customer_details: CustomerDetails {
                first_name: &request.customer_name,
                email: &request.customer_email,
            },
            item_details: [ItemDetails {
                id: &request.item_id,
                name: &request.item_name,
                price: request.amount,
                quantity: 1,
            }],
        };

        let url = Self::url(&self.config.snap_base_url, "/snap/v1/transactions");
        debug!(order_id = %request.order_id, %url, "Creating Snap transaction");

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.config.server_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let snap: SnapResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(PaymentSession {
            token: snap.token,
            redirect_url: snap.redirect_url,
        })
    }

    async fn query_status(&self, order_id: &str) -> Result<GatewayStatus, GatewayError> {
        let url = Self::url(&self.config.api_base_url, &format!("/v2/{order_id}/status"));
        debug!(order_id, %url, "Querying payment status");

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.config.server_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: StatusResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        // Unknown orders come back as HTTP 200 with an embedded 404
        match body.transaction_status {
            Some(s) => Ok(GatewayStatus::parse(&s)),
            None => Err(GatewayError::Rejected {
                status: body
                    .status_code
                    .as_deref()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(status.as_u16()),
                message: body.status_message.unwrap_or_default(),
            }),
        }
    }
}

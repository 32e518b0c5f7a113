//! Payment DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{PaymentHandle, PollStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    /// Station the powerbank will be taken from once paid
    #[validate(range(min = 1, message = "station_id must be positive"))]
    pub station_id: i32,
}

/// Everything the client needs to open the Snap payment page
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentHandleDto {
    pub transaction_id: i32,
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
    pub amount: i64,
    pub client_key: String,
}

impl PaymentHandleDto {
    pub fn new(handle: PaymentHandle, client_key: &str) -> Self {
        Self {
            transaction_id: handle.transaction_id,
            order_id: handle.order_id,
            token: handle.token,
            redirect_url: handle.redirect_url,
            amount: handle.amount,
            client_key: client_key.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusDto {
    /// pending, success or failed
    pub status: String,
    /// Set once the rental is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i32>,
}

impl From<PollStatus> for PaymentStatusDto {
    fn from(status: PollStatus) -> Self {
        let transaction_id = match status {
            PollStatus::Success { transaction_id } => Some(transaction_id),
            PollStatus::Pending | PollStatus::Failed => None,
        };
        Self {
            status: status.as_str().to_string(),
            transaction_id,
        }
    }
}

/// Gateway push. Only `order_id` is read; the status is re-queried.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationPayload {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationAck {
    pub status: String,
}

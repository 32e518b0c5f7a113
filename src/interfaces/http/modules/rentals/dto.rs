//! Rental DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Station, Transaction};

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    pub id: i32,
    pub powerbank_id: Option<i32>,
    pub origin_station_id: i32,
    pub return_station_id: Option<i32>,
    /// Pending, Ongoing, Returned or Failed
    pub status: String,
    pub order_id: Option<String>,
    pub amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionDto {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            powerbank_id: t.powerbank_id,
            origin_station_id: t.origin_station_id,
            return_station_id: t.return_station_id,
            status: t.status.to_string(),
            order_id: t.order_id,
            amount: t.amount,
            created_at: t.created_at,
            date_returned: t.date_returned,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartRentalRequest {
    #[validate(range(min = 1, message = "station_id must be positive"))]
    pub station_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    /// Station the powerbank is put back into
    #[validate(range(min = 1, message = "station_id must be positive"))]
    pub station_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReopenResponse {
    pub station_id: i32,
    pub station_name: String,
    pub message: String,
}

impl From<Station> for ReopenResponse {
    fn from(s: Station) -> Self {
        Self {
            message: format!("Lock at {} opened", s.name),
            station_id: s.id,
            station_name: s.name,
        }
    }
}

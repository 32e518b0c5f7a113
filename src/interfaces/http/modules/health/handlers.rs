//! Liveness and database reachability

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

async fn ping(db: &DatabaseConnection) -> ComponentHealth {
    let started = Instant::now();
    let ping = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());
    match db.execute(ping).await {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ping(&state.db).await;
    let healthy = database.status == "ok";

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
        }),
    )
}

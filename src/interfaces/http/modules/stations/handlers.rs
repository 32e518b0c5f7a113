//! Station listing handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::error;

use super::dto::{InventoryDto, StationDto};
use crate::application::services::RentalService;
use crate::domain::{DomainResult, Station};
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse};

#[derive(Clone)]
pub struct StationState {
    pub rentals: Arc<RentalService>,
}

type StationList = Result<Json<ApiResponse<Vec<StationDto>>>, ApiError>;

fn listing(result: DomainResult<Vec<Station>>) -> StationList {
    let stations = result.map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        stations.into_iter().map(StationDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    responses((status = 200, description = "All stations", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn list_stations(State(state): State<StationState>) -> StationList {
    listing(state.rentals.list_stations().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/available",
    tag = "Stations",
    responses((status = 200, description = "Stations with at least one powerbank", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn list_available(State(state): State<StationState>) -> StationList {
    listing(state.rentals.list_available_stations().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/returnable",
    tag = "Stations",
    responses((status = 200, description = "Stations with at least one free slot", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn list_returnable(State(state): State<StationState>) -> StationList {
    listing(state.rentals.list_returnable_stations().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/audit",
    tag = "Stations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Counter against powerbank rows per station", body = ApiResponse<Vec<InventoryDto>>))
)]
pub async fn inventory(
    State(state): State<StationState>,
) -> Result<Json<ApiResponse<Vec<InventoryDto>>>, ApiError> {
    let report = state.rentals.inventory_report().await.map_err(api_error)?;
    for drifted in report.iter().filter(|i| !i.is_consistent()) {
        error!(
            station_id = drifted.station_id,
            powerbank_left = drifted.powerbank_left,
            available_rows = drifted.available_rows,
            "Station inventory drifted"
        );
    }
    Ok(Json(ApiResponse::success(
        report.into_iter().map(InventoryDto::from).collect(),
    )))
}

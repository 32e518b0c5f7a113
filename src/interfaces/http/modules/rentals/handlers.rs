//! Rental lifecycle handlers
//!
//! Every route here sits behind the auth middleware; the caller's id scopes
//! each lookup, so another user's rental answers 404.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ReopenResponse, ReturnRequest, StartRentalRequest, TransactionDto};
use crate::application::services::RentalService;
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct RentalState {
    pub rentals: Arc<RentalService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/rentals",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    request_body = StartRentalRequest,
    responses(
        (status = 201, description = "Rental started, lock opening", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Station not found"),
        (status = 409, description = "No powerbank available")
    )
)]
pub async fn start_rental(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<StartRentalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), ApiError> {
    let tx = state
        .rentals
        .start_rental(&user.user_id, request.station_id)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tx.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rentals",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Rental history, newest first", body = ApiResponse<Vec<TransactionDto>>))
)]
pub async fn list_rentals(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<TransactionDto>>>, ApiError> {
    let history = state.rentals.history(&user.user_id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        history.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/rentals/active",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Ongoing rental, null when there is none", body = ApiResponse<TransactionDto>))
)]
pub async fn active_rental(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Option<TransactionDto>>>, ApiError> {
    let active = state
        .rentals
        .active_rental(&user.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(active.map(Into::into))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rentals/{id}",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Rental", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_rental(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    let tx = state
        .rentals
        .get_rental(&user.user_id, id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(tx.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/rentals/{id}/return",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction id")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Powerbank returned", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Rental or station not found"),
        (status = 409, description = "Rental not ongoing or station full")
    )
)]
pub async fn return_powerbank(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ReturnRequest>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    let tx = state
        .rentals
        .return_powerbank(&user.user_id, id, request.station_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(tx.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/rentals/{id}/reopen",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Lock opened again", body = ApiResponse<ReopenResponse>),
        (status = 409, description = "Rental has no station to open"),
        (status = 502, description = "Lock controller unreachable")
    )
)]
pub async fn reopen_lock(
    State(state): State<RentalState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReopenResponse>>, ApiError> {
    let station = state
        .rentals
        .retry_open(&user.user_id, id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(station.into())))
}

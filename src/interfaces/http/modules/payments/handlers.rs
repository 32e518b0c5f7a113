//! Payment handlers: payment creation, client poll and gateway webhook

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info};

use super::dto::{
    CreatePaymentRequest, NotificationAck, NotificationPayload, PaymentHandleDto, PaymentStatusDto,
};
use crate::application::services::PaymentService;
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct PaymentState {
    pub payments: Arc<PaymentService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment opened, rental pending", body = ApiResponse<PaymentHandleDto>),
        (status = 404, description = "Station not found"),
        (status = 409, description = "No powerbank available"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn create_payment(
    State(state): State<PaymentState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentHandleDto>>), ApiError> {
    let handle = state
        .payments
        .create_pending_payment(&user.user_id, request.station_id)
        .await
        .map_err(api_error)?;
    let dto = PaymentHandleDto::new(handle, state.payments.client_key());
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}/status",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "pending, success or failed", body = ApiResponse<PaymentStatusDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn payment_status(
    State(state): State<PaymentState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PaymentStatusDto>>, ApiError> {
    let status = state
        .payments
        .poll_payment_status(&user.user_id, id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(status.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/notification",
    tag = "Payments",
    request_body = NotificationPayload,
    responses(
        (status = 200, description = "Notification accepted", body = NotificationAck),
        (status = 400, description = "Payload names no order"),
        (status = 502, description = "Gateway unreachable, redeliver later")
    )
)]
pub async fn payment_notification(
    State(state): State<PaymentState>,
    Json(payload): Json<NotificationPayload>,
) -> Result<Json<NotificationAck>, ApiError> {
    let Some(order_id) = payload.order_id.filter(|id| !id.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("order_id is required")),
        ));
    };
    debug!(
        %order_id,
        reported = payload.transaction_status.as_deref().unwrap_or("-"),
        "Payment notification received"
    );

    let settlement = state
        .payments
        .handle_notification(&order_id)
        .await
        .map_err(api_error)?;
    match settlement {
        Some(settlement) if settlement.transitioned => info!(
            %order_id,
            status = %settlement.transaction.status,
            "Notification settled payment"
        ),
        Some(_) => debug!(%order_id, "Notification for already settled order"),
        None => debug!(%order_id, "Notification did not settle order"),
    }

    Ok(Json(NotificationAck {
        status: "ok".to_string(),
    }))
}

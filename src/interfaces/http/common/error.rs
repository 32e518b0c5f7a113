//! DomainError → HTTP response mapping

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict(_)
        | DomainError::NoInventory { .. }
        | DomainError::StationFull { .. }
        | DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::DataInconsistency(_) | DomainError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DomainError::Gateway(_) | DomainError::HardwareUnreachable { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn api_error(e: DomainError) -> ApiError {
    let status = status_for(&e);
    if status.is_server_error() {
        error!(error = %e, status = status.as_u16(), "Request failed");
    }
    (status, Json(ApiResponse::error(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionStatus;

    #[test]
    fn lifecycle_errors_are_conflicts() {
        assert_eq!(
            status_for(&DomainError::NoInventory { station_id: 1 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DomainError::InvalidTransition {
                transaction_id: 1,
                status: TransactionStatus::Returned,
                operation: "return",
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        assert_eq!(
            status_for(&DomainError::Gateway("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&DomainError::HardwareUnreachable {
                address: "10.0.0.2".into(),
                reason: "timeout".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn envelope_carries_message() {
        let (status, Json(body)) = api_error(DomainError::not_found("Station", "id", 9));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Not found: Station with id=9"));
    }
}

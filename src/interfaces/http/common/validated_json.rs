//! `Json<T>` that also runs `validator::Validate`
//!
//! Malformed bodies answer 400, bodies that parse but fail validation
//! answer 422 with one `field: message` entry per violation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", rejection.body_text()),
            ),
            Self::Invalid(errors) => (StatusCode::UNPROCESSABLE_ENTITY, describe(&errors)),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::Service;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct ReturnBody {
        #[validate(range(min = 1, message = "must be a station id"))]
        station_id: i32,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<ReturnBody>) -> String {
        body.station_id.to_string()
    }

    async fn post_json(raw: &'static str) -> (StatusCode, String) {
        let mut svc = Router::new().route("/return", post(handler)).into_service();
        let req = Request::builder()
            .method("POST")
            .uri("/return")
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .unwrap();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let (status, body) = post_json(r#"{"station_id": 2}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = post_json("station=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn rule_violation_names_the_field() {
        let (status, body) = post_json(r#"{"station_id": 0}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("station_id: must be a station id"));
    }
}

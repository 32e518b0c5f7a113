//! `X-Request-Id` propagation
//!
//! An incoming id is reused, otherwise a UUID v4 is minted. The id is
//! stored as a [`RequestId`] extension, recorded on a `request` span and
//! echoed in the response.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::Service;

    use super::*;

    async fn call(incoming: Option<&str>) -> Option<String> {
        let mut svc = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
            .into_service();
        let mut req = Request::builder().uri("/");
        if let Some(id) = incoming {
            req = req.header(REQUEST_ID_HEADER, id);
        }
        let resp = svc.call(req.body(Body::empty()).unwrap()).await.unwrap();
        resp.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    #[tokio::test]
    async fn incoming_id_is_echoed() {
        assert_eq!(call(Some("req-42")).await.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn missing_id_is_generated() {
        let id = call(None).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}

//! Bearer token authentication for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;

use super::common::ApiResponse;
use crate::infrastructure::crypto::{verify_token, JwtConfig, TokenClaims};

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity, inserted as a request extension by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            email: claims.email,
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser::from(claims));
            next.run(request).await
        }
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            auth_error_response(AuthError::ExpiredToken)
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
    };
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::Service;

    use super::*;
    use crate::infrastructure::crypto::create_token;

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.username
    }

    fn app(config: JwtConfig) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(
                AuthState { jwt_config: config },
                auth_middleware,
            ))
    }

    async fn call(config: JwtConfig, auth: Option<String>) -> StatusCode {
        let mut req = Request::builder().uri("/me");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let mut svc = app(config).into_service();
        svc.call(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn valid_token_passes() {
        let config = JwtConfig::new("secret", 1);
        let token = create_token("u-1", "alice", "alice@example.com", &config).unwrap();
        assert_eq!(
            call(config, Some(format!("Bearer {token}"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn missing_or_foreign_token_is_rejected() {
        let config = JwtConfig::new("secret", 1);
        assert_eq!(call(config.clone(), None).await, StatusCode::UNAUTHORIZED);

        let other = JwtConfig::new("other-secret", 1);
        let token = create_token("u-1", "alice", "alice@example.com", &other).unwrap();
        assert_eq!(
            call(config, Some(format!("Bearer {token}"))).await,
            StatusCode::UNAUTHORIZED
        );
    }
}

//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, UserInfo};
use crate::application::services::RentalService;
use crate::domain::{DomainError, NewUser, RepositoryProvider};
use crate::infrastructure::crypto::{create_token, hash_password, verify_password, JwtConfig};
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub rentals: Arc<RentalService>,
    pub jwt_config: JwtConfig,
}

fn invalid_credentials() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error("Invalid credentials")),
    )
}

fn internal(message: impl std::fmt::Display) -> ApiError {
    api_error(DomainError::Database(message.to_string()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .repos
        .users()
        .find_by_login(&request.username)
        .await
        .map_err(api_error)?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&request.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        warn!(username = %request.username, "Login rejected");
        return Err(invalid_credentials());
    }

    let token = create_token(&user.id, &user.username, &user.email, &state.jwt_config)
        .map_err(internal)?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: user.into(),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserInfo>),
        (status = 422, description = "Validation error"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let password_hash = hash_password(&request.password).map_err(internal)?;

    let user = state
        .repos
        .users()
        .create(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
        })
        .await
        .map_err(api_error)?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user and rental history", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let user = state
        .repos
        .users()
        .find_by_id(&caller.user_id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| api_error(DomainError::not_found("User", "id", &caller.user_id)))?;

    let rentals = state
        .rentals
        .history(&user.id)
        .await
        .map_err(api_error)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::success(ProfileResponse {
        user: user.into(),
        rentals,
    })))
}

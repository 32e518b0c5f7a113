//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "powerbank-rental".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            ..Self::default()
        }
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, username: &str, email: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    username: &str,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let token_claims = TokenClaims::new(user_id, username, email, config);

    encode(
        &Header::default(),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let config = JwtConfig::new("test-secret", 1);
        let token = create_token("u-1", "alice", "alice@example.com", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("u-1", "alice", "a@b.c", &JwtConfig::new("one", 1)).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("two", 1)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig::new("test-secret", -2);
        let token = create_token("u-1", "alice", "a@b.c", &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}

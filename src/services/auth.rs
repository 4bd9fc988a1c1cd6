//! Session issuing and verification

use serde_json::Value;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::SessionClaims,
};

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Sign a session token for the caller-supplied identity payload
    pub fn issue_token(&self, payload: Value) -> AppResult<String> {
        let claims = SessionClaims::from_payload(payload, self.config.token_ttl_days)?;
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))?;

        tracing::info!("Issued session for {}", claims.email);
        Ok(token)
    }

    /// Verify signature and expiry of a session token
    pub fn verify_token(&self, token: &str) -> AppResult<SessionClaims> {
        SessionClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Unauthenticated(e.to_string()))
    }
}

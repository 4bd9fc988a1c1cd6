//! Session token claims

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// JWT claims carried by the session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    /// Any other members the caller put in the identity payload
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims from a caller-supplied identity payload, valid for `ttl_days`
    pub fn from_payload(payload: Value, ttl_days: i64) -> AppResult<Self> {
        let Value::Object(mut members) = payload else {
            return Err(AppError::InvalidRequest(
                "Identity payload must be a JSON object".to_string(),
            ));
        };

        let email = match members.remove("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => email,
            _ => {
                return Err(AppError::InvalidRequest(
                    "Identity payload must contain an email".to_string(),
                ))
            }
        };

        // Registered claims are always set by the server
        members.remove("iat");
        members.remove("exp");

        let now = Utc::now();
        Ok(Self {
            email,
            extra: members,
            iat: now.timestamp(),
            exp: (now + Duration::days(ttl_days)).timestamp(),
        })
    }

    /// Create a signed JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature and expiry).
    /// An `aud` member from the identity payload is carried, not checked.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        validation.validate_aud = false;

        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    /// Ownership check for routes scoped to one borrower
    pub fn require_email(&self, email: &str) -> AppResult<()> {
        if self.email == email {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden: Email mismatch".to_string()))
        }
    }
}

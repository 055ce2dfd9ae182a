//! Signed upload tokens.
//!
//! Token = HS256 JWT with claims `ts` (issuance, epoch millis), `iat` and `exp`
//! (epoch seconds). Verification is stateless: signature plus expiry, nothing
//! is remembered server-side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sievecam_core::AppError;

/// Claims carried by an upload token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuance time in milliseconds since the epoch
    pub ts: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies upload tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid from now until now + ttl.
    pub fn issue(&self) -> Result<String, AppError> {
        self.issue_at(Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = TokenClaims {
            ts: now.timestamp_millis(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal {
                message: "Failed to sign upload token".to_string(),
                source: e.into(),
            })
    }

    /// Verify signature and expiry against the system clock.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as if the current time were `now`.
    ///
    /// A token stops being valid at the second its `exp` is reached.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Auth("Missing upload token".to_string()));
        }

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(format!("Invalid upload token: {}", e)))?;

        if now.timestamp() >= data.claims.exp {
            return Err(AppError::Auth("Upload token has expired".to_string()));
        }

        Ok(data.claims)
    }
}

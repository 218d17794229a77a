//! JWT issuance and validation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use palisade_common::AdminError;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, stringified
    pub sub: String,

    /// Issued-at, Unix seconds
    pub iat: u64,

    /// Expiry, Unix seconds
    pub exp: u64,
}

/// HS256 key pair plus the configured token lifetime.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Result<Self, AdminError> {
        let expiry = config
            .expiry_duration()
            .map_err(|e| AdminError::Config(e.to_string()))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            expiry,
        })
    }

    pub fn expiry_secs(&self) -> u64 {
        self.expiry.as_secs()
    }

    /// Issue an access token for a user id.
    pub fn issue(&self, user_id: i64) -> Result<String, AdminError> {
        let now = unix_now()?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AdminError::Internal(format!("token encode failed: {e}")))
    }

    /// Validate a token and return its claims. Any failure, including
    /// expiry, reads as an auth error.
    pub fn decode(&self, token: &str) -> Result<Claims, AdminError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| AdminError::Auth("invalid token".to_string()))?;
        Ok(data.claims)
    }
}

fn unix_now() -> Result<u64, AdminError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AdminError::Internal(format!("system time error: {e}")))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".to_string(),
            expiry: "15m".to_string(),
            cookie_name: "access_token".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn issue_and_decode_roundtrip() {
        let keys = keys();
        let token = keys.issue(42).unwrap();
        let claims = keys.decode(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys().issue(42).unwrap();

        let other = JwtKeys::new(&JwtConfig {
            secret: "different-secret".to_string(),
            expiry: "15m".to_string(),
            cookie_name: "access_token".to_string(),
        })
        .unwrap();

        assert!(matches!(
            other.decode(&token),
            Err(AdminError::Auth(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let now = unix_now().unwrap();
        // Expired well past the validator's leeway.
        let claims = Claims {
            sub: "42".to_string(),
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(keys.decode(&token), Err(AdminError::Auth(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            keys().decode("not.a.token"),
            Err(AdminError::Auth(_))
        ));
    }
}

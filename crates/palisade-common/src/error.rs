//! Common error types for Palisade components.

use thiserror::Error;

/// Common errors across Palisade components
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value store unreachable or erroring
    #[error("Store unavailable: {0}")]
    Store(String),

    /// Relational database error
    #[error("Database error: {0}")]
    Database(String),

    /// Captcha rendering/encoding error
    #[error("Captcha error: {0}")]
    Captcha(String),

    /// Authentication error
    #[error("Auth error: {0}")]
    Auth(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or state conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Store(_) => 503,
            Self::Database(_) => 500,
            Self::Captcha(_) => 500,
            Self::Auth(_) => 401,
            Self::Forbidden(_) => 403,
            Self::RateLimited(_) => 429,
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Message safe to hand to an end user. Infrastructure variants hide
    /// their detail; client-caused variants keep it.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Internal(_) | Self::Captcha(_) => {
                "Internal server error".to_string()
            }
            Self::Store(_) => "Service temporarily unavailable".to_string(),
            Self::Database(_) => "Database error occurred".to_string(),
            Self::Auth(msg)
            | Self::Forbidden(msg)
            | Self::RateLimited(msg)
            | Self::InvalidInput(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

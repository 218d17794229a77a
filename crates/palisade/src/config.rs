//! Configuration management for Palisade.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use palisade_common::constants::{
    CAPTCHA_CODE_LENGTH, CAPTCHA_HEIGHT, CAPTCHA_RATE_LIMIT_PER_MINUTE, CAPTCHA_TTL_SECS,
    CAPTCHA_WIDTH, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRY, DEFAULT_LISTEN_ADDR,
    DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_REDIS_URL, LOGIN_RATE_LIMIT_PER_MINUTE,
    http::ACCESS_TOKEN_COOKIE, store_keys::CAPTCHA_PREFIX,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Captcha configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// JWT-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret
    #[serde(default = "default_jwt_secret")]
    pub secret: String,

    /// Access token validity, e.g. "10s", "5m", "12h", "7d"
    #[serde(default = "default_jwt_expiry")]
    pub expiry: String,

    /// Cookie the token travels in
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl JwtConfig {
    pub fn expiry_duration(&self) -> Result<Duration> {
        parse_expiry(&self.expiry)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            expiry: default_jwt_expiry(),
            cookie_name: default_cookie_name(),
        }
    }
}

/// Captcha-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Image width in pixels
    #[serde(default = "default_captcha_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_captcha_height")]
    pub height: u32,

    /// Number of characters in the code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Store key prefix for stored answers
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Answer validity in seconds
    #[serde(default = "default_captcha_ttl")]
    pub expire_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            width: default_captcha_width(),
            height: default_captcha_height(),
            code_length: default_code_length(),
            key_prefix: default_key_prefix(),
            expire_secs: default_captcha_ttl(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Default per-client requests per minute
    #[serde(default = "default_rate_limit")]
    pub per_minute: u32,

    /// Captcha issue requests per minute per client
    #[serde(default = "default_captcha_rate_limit")]
    pub captcha_per_minute: u32,

    /// Login attempts per minute per client
    #[serde(default = "default_login_rate_limit")]
    pub login_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: default_rate_limit(),
            captcha_per_minute: default_captcha_rate_limit(),
            login_per_minute: default_login_rate_limit(),
        }
    }
}

// Default value functions
fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}
fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}
fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}
fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}
fn default_jwt_expiry() -> String {
    DEFAULT_JWT_EXPIRY.to_string()
}
fn default_cookie_name() -> String {
    ACCESS_TOKEN_COOKIE.to_string()
}
fn default_captcha_width() -> u32 {
    CAPTCHA_WIDTH
}
fn default_captcha_height() -> u32 {
    CAPTCHA_HEIGHT
}
fn default_code_length() -> usize {
    CAPTCHA_CODE_LENGTH
}
fn default_key_prefix() -> String {
    CAPTCHA_PREFIX.to_string()
}
fn default_captcha_ttl() -> u64 {
    CAPTCHA_TTL_SECS
}
fn default_rate_limit() -> u32 {
    DEFAULT_RATE_LIMIT_PER_MINUTE
}
fn default_captcha_rate_limit() -> u32 {
    CAPTCHA_RATE_LIMIT_PER_MINUTE
}
fn default_login_rate_limit() -> u32 {
    LOGIN_RATE_LIMIT_PER_MINUTE
}

impl AppConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist. CLI overrides are applied by the caller.
    pub fn load(config_path: &str) -> Result<Self> {
        if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")
        } else {
            tracing::warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject configurations the services cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.is_empty() {
            bail!("jwt.secret must not be empty");
        }
        self.jwt
            .expiry_duration()
            .context("jwt.expiry is not a valid duration")?;
        if self.captcha.code_length == 0 {
            bail!("captcha.code_length must be at least 1");
        }
        if self.captcha.expire_secs == 0 {
            // Redis rejects non-positive expiries.
            bail!("captcha.expire_secs must be at least 1");
        }
        if self.captcha.width == 0 || self.captcha.height == 0 {
            bail!("captcha image dimensions must be non-zero");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            listen_addr: default_listen_addr(),
            database_url: default_database_url(),
            jwt: JwtConfig::default(),
            captcha: CaptchaConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Parse a human expiry string ("10s", "5m", "12h", "7d") into a duration.
pub fn parse_expiry(value: &str) -> Result<Duration> {
    let value = value.trim();
    if value.len() < 2 {
        bail!("invalid expiry format: {value:?}");
    }

    let (number, unit) = value.split_at(value.len() - 1);
    let number: u64 = number
        .parse()
        .with_context(|| format!("invalid expiry format: {value:?}"))?;

    let secs = match unit {
        "s" => number,
        "m" => number * 60,
        "h" => number * 3600,
        "d" => number * 86400,
        _ => bail!("invalid expiry unit: {value:?}"),
    };

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_expiry_accepts_all_units() {
        assert_eq!(parse_expiry("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_expiry("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_expiry("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_expiry("7d").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn parse_expiry_rejects_garbage() {
        assert!(parse_expiry("").is_err());
        assert!(parse_expiry("m").is_err());
        assert!(parse_expiry("15").is_err());
        assert!(parse_expiry("15w").is_err());
        assert!(parse_expiry("abcm").is_err());
    }

    #[test]
    fn defaults_match_the_captcha_contract() {
        let config = AppConfig::default();
        assert_eq!(config.captcha.width, 120);
        assert_eq!(config.captcha.height, 40);
        assert_eq!(config.captcha.code_length, 4);
        assert_eq!(config.captcha.key_prefix, "captcha:");
        assert_eq!(config.captcha.expire_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.captcha.expire_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.jwt.secret = String::new();
        assert!(config.validate().is_err());
    }
}

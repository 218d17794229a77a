//! Application state and shared resources.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use sqlx::SqlitePool;

use crate::auth::jwt::JwtKeys;
use crate::captcha::CaptchaService;
use crate::config::AppConfig;
use crate::db;
use crate::ratelimit::RateLimiter;
use crate::store::{ExpiringStore, RedisStore};

/// Shared application state
///
/// Every service takes its collaborators through here; there is no ambient
/// global state. Tests build this struct directly with a `MemoryStore` and
/// a throwaway database.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Relational database pool
    pub db: SqlitePool,

    /// Expiring key-value store (captcha answers, rate-limit counters)
    pub store: Arc<dyn ExpiringStore>,

    /// Captcha lifecycle service
    pub captcha: Arc<CaptchaService>,

    /// JWT signing/verification keys
    pub jwt: Arc<JwtKeys>,

    /// Fixed-window rate limiter
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create new application state, connecting to Redis and the database.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .context("Failed to create Redis client")?;

        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        let store: Arc<dyn ExpiringStore> = Arc::new(RedisStore::new(redis));

        let db = db::connect(&config.database_url)
            .await
            .context("Failed to open database")?;

        let captcha = Arc::new(CaptchaService::new(config.captcha.clone(), store.clone())?);
        let jwt = Arc::new(JwtKeys::new(&config.jwt)?);
        let limiter = Arc::new(RateLimiter::new(store.clone()));

        Ok(Self {
            config,
            db,
            store,
            captcha,
            jwt,
            limiter,
        })
    }
}

//! Fixed-window rate limiting backed by the expiring store.
//!
//! A counter per {scope, client} is incremented on every hit; the window
//! starts when the counter is created and ends when its expiry evicts it.

use std::sync::Arc;

use axum::http::HeaderMap;
use palisade_common::constants::http::{X_FORWARDED_FOR, X_REAL_IP};
use palisade_common::constants::store_keys::RATELIMIT_PREFIX;

use crate::store::ExpiringStore;

const WINDOW_SECS: u64 = 60;

pub struct RateLimiter {
    store: Arc<dyn ExpiringStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self { store }
    }

    /// Count a hit and report whether the caller is within `limit` for the
    /// current window. Store failures are logged and let the request
    /// through; the limiter never turns a store outage into a 429.
    pub async fn allow(&self, scope: &str, client: &str, limit: u32) -> bool {
        let key = format!("{RATELIMIT_PREFIX}{scope}:{client}");
        match self.store.incr_with_expiry(&key, WINDOW_SECS).await {
            Ok(count) => count <= u64::from(limit),
            Err(err) => {
                tracing::warn!(scope, error = %err, "Rate limiter store error, allowing request");
                true
            }
        }
    }
}

/// Client identity for rate limiting. The service sits behind a reverse
/// proxy, so forwarded headers win; without one, all callers share a local
/// bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    for name in [X_FORWARDED_FOR, X_REAL_IP] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    "local".to_string()
}

//! Shared constants for Palisade components.

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default SQLite database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite://palisade.db";

/// Captcha answer expiry in the store (1 minute)
pub const CAPTCHA_TTL_SECS: u64 = 60;

/// Captcha code length (uppercase letters + digits)
pub const CAPTCHA_CODE_LENGTH: usize = 4;

/// Captcha image width in pixels
pub const CAPTCHA_WIDTH: u32 = 120;

/// Captcha image height in pixels
pub const CAPTCHA_HEIGHT: u32 = 40;

/// Default access token validity
pub const DEFAULT_JWT_EXPIRY: &str = "15m";

/// Default global rate limit per client
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Captcha issue limit per client
pub const CAPTCHA_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Login attempt limit per client
pub const LOGIN_RATE_LIMIT_PER_MINUTE: u32 = 5;

/// Store key prefixes
pub mod store_keys {
    /// Captcha answer: captcha:{captcha_id}
    pub const CAPTCHA_PREFIX: &str = "captcha:";

    /// Rate limit counters: ratelimit:{scope}:{client}
    pub const RATELIMIT_PREFIX: &str = "ratelimit:";
}

/// HTTP header and cookie names
pub mod http {
    /// Cookie carrying the access token
    pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

    /// Forwarded client address (from the reverse proxy)
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

    /// Real client address (from the reverse proxy)
    pub const X_REAL_IP: &str = "x-real-ip";
}

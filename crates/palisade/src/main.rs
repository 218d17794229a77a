//! # Palisade - Admin Console Backend
//!
//! Captcha-gated authentication plus user/role/department/menu management.
//!
//! ## Architecture
//! ```text
//! Client → Axum → Services → SQLite (records)
//!                     ↓
//!                  Redis (captcha answers, rate limits)
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use palisade::config::AppConfig;
use palisade::db;
use palisade::routes;
use palisade::state::AppState;

/// Palisade - Admin Console Backend
#[derive(Parser, Debug)]
#[command(name = "palisade")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/palisade.toml")]
    config: String,

    /// Redis URL (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// JWT signing secret (overrides config)
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run migrations and seed the initial admin account
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🏰 Starting Palisade v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with CLI overrides
    let mut config = AppConfig::load(&args.config)?;
    if let Some(redis_url) = args.redis_url {
        config.redis_url = redis_url;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(jwt_secret) = args.jwt_secret {
        config.jwt.secret = jwt_secret;
    }
    config.validate()?;
    info!("📋 Configuration loaded from {}", args.config);

    if config.jwt.secret == "change-me-in-production" {
        warn!("JWT secret is the built-in default; set jwt.secret or JWT_SECRET");
    }

    if matches!(args.command, Some(Command::InitDb)) {
        let pool = db::connect(&config.database_url).await?;
        db::seed_admin(&pool).await?;
        info!("✅ Database initialized");
        return Ok(());
    }

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    info!("✅ Redis connected: {}", config.redis_url);
    info!("✅ Database ready: {}", config.database_url);

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("🚀 Palisade listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 Palisade shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}

//! # Warden - Siteverify Gateway
//!
//! Verifies CAPTCHA tokens on behalf of backends that would rather not
//! hold the siteverify secret themselves.
//!
//! ## Architecture
//! ```text
//! Backend → Warden → siteverify
//!             ↓
//!      ConstraintEngine
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use warden::config::{AppConfig, ConfigOverrides};
use warden::routes;
use warden::state::AppState;

/// Warden - siteverify gateway
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/warden.toml")]
    config: String,

    /// Siteverify secret (overrides config)
    #[arg(long, env = "WARDEN_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Siteverify endpoint (overrides config)
    #[arg(long, env = "WARDEN_VERIFY_URL")]
    verify_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            secret: self.secret.clone(),
            listen: self.listen.clone(),
            verify_url: self.verify_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up WARDEN_SECRET and friends from .env before clap reads the environment
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args.overrides())?;
    info!(
        verify_url = %config.verify_url,
        timeout_secs = config.timeout_secs,
        "Configuration loaded from {}",
        args.config
    );

    let listen_addr = config.listen_addr.clone();

    // Initialize application state
    let state = AppState::new(config)?;

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Warden listening on {}", listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Warden shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}

//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::verify::{HttpClient, ReqwestClient, Verifier};

/// Shared application state
pub struct AppState<C = ReqwestClient> {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Siteverify client with the configured default constraints
    pub verifier: Arc<Verifier<C>>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

// Manual impl: `derive(Clone)` would demand `C: Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            verifier: self.verifier.clone(),
            started_at: self.started_at,
        }
    }
}

impl AppState<ReqwestClient> {
    /// Create application state with the default `reqwest` transport
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ReqwestClient::new(Duration::from_secs(config.timeout_secs))
            .context("Failed to build siteverify client")?;

        Ok(Self::with_client(config, client))
    }
}

impl<C: HttpClient> AppState<C> {
    /// Create application state around an arbitrary transport
    pub fn with_client(config: AppConfig, client: C) -> Self {
        let mut verifier = Verifier::new(config.secret.clone(), client)
            .with_endpoint(config.verify_url.clone());
        verifier.set_constraints(config.constraints.to_constraints());

        tracing::debug!(
            endpoint = %config.verify_url,
            constraints = ?verifier.constraints(),
            "Verifier configured"
        );

        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

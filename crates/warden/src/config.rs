//! Configuration management for Warden.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use warden_common::Constraints;
use warden_common::constants::{DEFAULT_LISTEN_ADDR, DEFAULT_TIMEOUT_SECS, SITE_VERIFY_URL};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Siteverify secret for the site key
    #[serde(default)]
    pub secret: String,

    /// Siteverify endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Constraints applied when a request does not bring its own
    #[serde(default)]
    pub constraints: ConstraintsConfig,
}

/// Default constraints, `[constraints]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstraintsConfig {
    pub hostname: Option<String>,
    pub apk_package_name: Option<String>,
    /// Run through `sane_action` before use
    pub action: Option<String>,
    pub threshold: Option<f64>,
    /// Maximum challenge age in seconds
    pub challenge_ts: Option<u64>,
}

impl ConstraintsConfig {
    pub fn to_constraints(&self) -> Constraints {
        let mut constraints = Constraints {
            hostname: self.hostname.clone(),
            apk_package_name: self.apk_package_name.clone(),
            threshold: self.threshold,
            challenge_ts: self.challenge_ts,
            ..Default::default()
        };
        if let Some(ref action) = self.action {
            constraints = constraints.with_sane_action(action);
        }
        constraints
    }
}

/// Values given on the command line or environment, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub secret: Option<String>,
    pub listen: Option<String>,
    pub verify_url: Option<String>,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_verify_url() -> String { SITE_VERIFY_URL.to_string() }
fn default_timeout() -> u64 { DEFAULT_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let config = if Path::new(config_path).exists() {
            Self::from_file(config_path)?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        config.with_overrides(overrides).validated()
    }

    fn from_file(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("Failed to load config file")?;

        settings
            .try_deserialize()
            .context("Failed to parse config")
    }

    fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(ref secret) = overrides.secret {
            self.secret = secret.clone();
        }
        if let Some(ref listen) = overrides.listen {
            self.listen_addr = listen.clone();
        }
        if let Some(ref verify_url) = overrides.verify_url {
            self.verify_url = verify_url.clone();
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if self.secret.trim().is_empty() {
            bail!("No siteverify secret configured (set `secret` or WARDEN_SECRET)");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if let Some(threshold) = self.constraints.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("constraints.threshold must be within [0, 1], got {}", threshold);
            }
        }
        Ok(self)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            secret: String::new(),
            verify_url: default_verify_url(),
            timeout_secs: default_timeout(),
            constraints: ConstraintsConfig::default(),
        }
    }
}

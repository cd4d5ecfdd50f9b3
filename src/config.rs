// ABOUTME: Environment-based configuration for endpoints, storage, and operation timeouts
// ABOUTME: SNAPCAL_* variables with warn-and-default parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use crate::errors::{AppError, AppResult};
use crate::gateway::GatewayConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Default analysis service base URL (local functions emulator)
pub const DEFAULT_ANALYZER_URL: &str = "http://127.0.0.1:5001/food-analyzer/";

/// Default nutrition search base URL (local functions emulator)
pub const DEFAULT_SEARCH_URL: &str = "http://127.0.0.1:5001/nutrition-search/";

/// Default sqlite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/snapcal.db";

const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 45;
const DEFAULT_SAVE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the analysis service
    pub analyzer_url: Url,
    /// Base URL of the nutrition search function
    pub search_url: Url,
    /// Record store connection string
    pub database_url: String,
    /// Client timeout on the analysis request
    pub analysis_timeout: Duration,
    /// Overall bound on a save operation
    pub save_timeout: Duration,
    /// Bound on each read operation
    pub read_timeout: Duration,
    /// Run the connectivity preflight before every save
    pub preflight: bool,
    /// Override for the installation identity file
    pub identity_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `SNAPCAL_*` environment variables, falling
    /// back to development defaults with a warning on unparseable values.
    ///
    /// # Errors
    ///
    /// Returns a config error when a provided URL does not parse.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            analyzer_url: env_url("SNAPCAL_ANALYZER_URL", DEFAULT_ANALYZER_URL)?,
            search_url: env_url("SNAPCAL_SEARCH_URL", DEFAULT_SEARCH_URL)?,
            database_url: env::var("SNAPCAL_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned()),
            analysis_timeout: env_duration_secs(
                "SNAPCAL_ANALYSIS_TIMEOUT_SECS",
                DEFAULT_ANALYSIS_TIMEOUT_SECS,
            ),
            save_timeout: env_duration_secs("SNAPCAL_SAVE_TIMEOUT_SECS", DEFAULT_SAVE_TIMEOUT_SECS),
            read_timeout: env_duration_secs("SNAPCAL_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS),
            preflight: env_bool("SNAPCAL_PREFLIGHT", true),
            identity_path: env::var("SNAPCAL_IDENTITY_FILE").ok().map(PathBuf::from),
        })
    }

    /// Gateway policy derived from this configuration
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            save_timeout: self.save_timeout,
            read_timeout: self.read_timeout,
            preflight: self.preflight,
            ..GatewayConfig::default()
        }
    }
}

fn env_url(key: &str, default: &str) -> AppResult<Url> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_owned());
    Url::parse(&raw).map_err(|e| AppError::config(format!("{key} is not a valid URL: {e}")))
}

fn env_duration_secs(key: &str, default: u64) -> Duration {
    let secs = match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable timeout, using default");
            default
        }),
        Err(_) => default,
    };
    Duration::from_secs(secs)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!(key, value = %raw, "unparseable boolean, using default");
                default
            }
        },
        Err(_) => default,
    }
}

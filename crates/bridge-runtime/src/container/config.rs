//! # Bridge Configuration
//!
//! Unified configuration for the registry API and the event router.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. JSON file named by `TB_CONFIG`
//! 3. Environment overrides (`PORT`, `TB_HOST`, `TB_REGISTRY_DIR`,
//!    `TB_EVENTS_DIR`, `TB_API_KEY`, `TB_DRAIN_INTERVAL_MS`,
//!    `TB_DISPATCH_TIMEOUT_MS`)
//!
//! An override that does not parse is ignored with a warning.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_bus::{DEFAULT_DISPATCH_TIMEOUT, DEFAULT_DRAIN_INTERVAL};
use std::path::PathBuf;
use std::time::Duration;
use tb_02_registry_api::{
    humantime_serde, ApiConfig, AuthConfig, ConfigError, CorsConfig, HttpConfig, PathsConfig,
};
use tracing::{info, warn};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "TB_CONFIG";

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// HTTP listener.
    pub http: HttpConfig,
    /// Registry and events directories.
    pub paths: PathsConfig,
    /// Drain cadence and dispatch bounds.
    pub router: RouterConfig,
    /// Event ingestion authentication.
    pub auth: AuthConfig,
    /// CORS for browser realms.
    pub cors: CorsConfig,
}

/// Event router configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Period between drain ticks.
    #[serde(with = "humantime_serde")]
    pub drain_interval: Duration,
    /// Upper bound on one satellite call; `0s` disables the bound.
    #[serde(with = "humantime_serde")]
    pub dispatch_timeout: Duration,
    /// Mirror pending events to `queue.ndjson` after each tick.
    pub journal_queue: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            drain_interval: DEFAULT_DRAIN_INTERVAL,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            journal_queue: true,
        }
    }
}

impl RouterConfig {
    /// Dispatch bound as the router expects it.
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        (!self.dispatch_timeout.is_zero()).then_some(self.dispatch_timeout)
    }
}

impl BridgeConfig {
    /// Validate before anything binds or spawns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_config().validate()?;

        if self.router.drain_interval.is_zero() {
            return Err(ConfigError::InvalidInterval(
                "drain_interval must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// The slice of configuration the Registry API consumes.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            http: self.http.clone(),
            paths: self.paths.clone(),
            auth: self.auth.clone(),
            cors: self.cors.clone(),
        }
    }

    /// Parse a JSON document; absent sections keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PORT") {
            match value.trim().parse() {
                Ok(port) => self.http.port = port,
                Err(_) => warn!(var = "PORT", value = %value, "Ignoring unparseable override"),
            }
        }
        if let Some(value) = lookup("TB_HOST") {
            match value.trim().parse() {
                Ok(host) => self.http.host = host,
                Err(_) => warn!(var = "TB_HOST", value = %value, "Ignoring unparseable override"),
            }
        }
        if let Some(value) = lookup("TB_REGISTRY_DIR") {
            self.paths.registry_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("TB_EVENTS_DIR") {
            self.paths.events_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("TB_API_KEY") {
            self.auth.api_key = Some(value);
        }
        if let Some(ms) = parse_millis(&lookup, "TB_DRAIN_INTERVAL_MS") {
            self.router.drain_interval = ms;
        }
        if let Some(ms) = parse_millis(&lookup, "TB_DISPATCH_TIMEOUT_MS") {
            self.router.dispatch_timeout = ms;
        }
    }
}

fn parse_millis<F>(lookup: &F, var: &'static str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var)?;
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!(var, value = %value, "Ignoring unparseable override");
            None
        }
    }
}

/// Load configuration from the optional file and the process environment.
pub fn load_config() -> anyhow::Result<BridgeConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            let config = BridgeConfig::from_json(&text)
                .with_context(|| format!("parsing config file {path}"))?;
            info!(path = %path, "Loaded configuration file");
            config
        }
        Err(_) => BridgeConfig::default(),
    };

    config.apply_env(|var| std::env::var(var).ok());
    Ok(config)
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "ECOGEST";
const DEFAULT_ROWS_PER_PAGE: u32 = 5;
const DEFAULT_SEARCH_MIN_CHARS: usize = 3;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_CACHE_EVENT_CAPACITY: usize = 256;
const SESSION_DIR: &str = ".ecogest";
const SESSION_FILE: &str = "session.json";

/// Query cache configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds after which a cached result is treated as stale even without
    /// an explicit invalidation. Unset means "fresh until invalidated".
    #[serde(default)]
    pub stale_after_secs: Option<u64>,

    /// Capacity of the cache event broadcast channel
    #[serde(default = "default_cache_event_capacity")]
    #[validate(range(min = 1))]
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: None,
            event_capacity: default_cache_event_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn stale_after(&self) -> Option<Duration> {
        self.stale_after_secs.map(Duration::from_secs)
    }
}

/// Client configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the EcoGest REST backend
    #[validate(custom = "validate_base_url")]
    pub api_base_url: String,

    /// Application environment
    #[serde(default = "default_env")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Where the auth token is persisted
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Fixed table page size
    #[serde(default = "default_rows_per_page")]
    #[validate(range(min = 1, max = 100))]
    pub rows_per_page: u32,

    /// Minimum characters before a name search is issued
    #[serde(default = "default_search_min_chars")]
    #[validate(range(min = 1))]
    pub search_min_chars: usize,

    /// Quiet period after the last keystroke before searching
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Request timeout; unset leaves it to the OS
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Query cache configuration
    #[serde(default)]
    #[validate]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the base URL
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            environment: default_env(),
            log_level: default_log_level(),
            log_json: false,
            token_file: None,
            rows_per_page: default_rows_per_page(),
            search_min_chars: default_search_min_chars(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: None,
            cache: CacheConfig::default(),
        }
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Token file location, falling back to `$HOME/.ecogest/session.json`
    pub fn token_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.token_file {
            return Some(path.clone());
        }
        env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(SESSION_DIR).join(SESSION_FILE))
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_rows_per_page() -> u32 {
    DEFAULT_ROWS_PER_PAGE
}

fn default_search_min_chars() -> usize {
    DEFAULT_SEARCH_MIN_CHARS
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_cache_event_capacity() -> usize {
    DEFAULT_CACHE_EVENT_CAPACITY
}

fn validate_base_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => {
            let mut err = ValidationError::new("api_base_url");
            err.message = Some("api_base_url must be an absolute http(s) URL".into());
            Err(err)
        }
    }
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("ecogest={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads client configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (ECOGEST__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&config_dir.join("default").to_string_lossy()).required(false))
        .add_source(File::with_name(&config_dir.join(&run_env).to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    if config.get_string("api_base_url").is_err() {
        error!("API base URL is not configured. Set ECOGEST__API_BASE_URL or api_base_url in config/default.toml.");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "api_base_url is required but not configured".into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

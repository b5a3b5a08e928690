//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `HISRIS_API_BASE_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `HISRIS_API_BASE_URL`: API base URL including `/api/v1` (required)
//! - `HISRIS_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `HISRIS_API_USER_AGENT`: User-Agent header
//! - `HISRIS_SESSION_PATH`: File the session is persisted to
//! - `HISRIS_LOG_LEVEL`: Default tracing filter
//! - `HISRIS_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hisris.json` or `./hisris.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use hisris_domain::{ApiConfig, ClientConfig, HisRisError, LoggingConfig, Result, SessionConfig};
use url::Url;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is not
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `HisRisError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `HISRIS_API_BASE_URL` is required; every other setting falls back to
/// its default.
///
/// # Errors
/// Returns `HisRisError::Config` if the base URL is missing or any value is
/// invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ApiConfig::default();

    let base_url = env_var("HISRIS_API_BASE_URL")?;
    let timeout_secs = match std::env::var("HISRIS_API_TIMEOUT_SECS") {
        Ok(s) => s
            .parse::<u64>()
            .map_err(|e| HisRisError::Config(format!("Invalid request timeout: {}", e)))?,
        Err(_) => defaults.timeout_secs,
    };
    let user_agent = std::env::var("HISRIS_API_USER_AGENT").unwrap_or(defaults.user_agent);

    let persist_path = std::env::var_os("HISRIS_SESSION_PATH").map(PathBuf::from);
    let level =
        std::env::var("HISRIS_LOG_LEVEL").unwrap_or_else(|_| LoggingConfig::default().level);
    let json = env_bool("HISRIS_LOG_JSON", false);

    let config = ClientConfig {
        api: ApiConfig { base_url, timeout_secs, user_agent },
        session: SessionConfig { persist_path },
        logging: LoggingConfig { level, json },
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `HisRisError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HisRisError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HisRisError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HisRisError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Check values serde cannot: URL shape and a usable timeout.
///
/// # Errors
/// Returns `HisRisError::Config` describing the first invalid value.
pub fn validate(config: &ClientConfig) -> Result<()> {
    let url = Url::parse(&config.api.base_url).map_err(|e| {
        HisRisError::Config(format!("Invalid API base URL '{}': {}", config.api.base_url, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HisRisError::Config(format!(
            "API base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(HisRisError::Config("Request timeout must be greater than zero".into()));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HisRisError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HisRisError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(HisRisError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parents (up to 2 levels) and
/// the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("hisris.json"),
        dir.join("hisris.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `HisRisError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        HisRisError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

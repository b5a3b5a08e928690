//! Tracing subscriber installation

use hisris_domain::{HisRisError, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, HisRisError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| HisRisError::Config(format!("Invalid log level '{}': {}", config.level, e)))
}

/// Install a global `fmt` subscriber.
///
/// Returns `Ok(false)` if a global subscriber was already installed, so it is
/// safe to call more than once.
///
/// # Errors
/// Returns `HisRisError::Config` if the configured level is not a valid
/// filter directive.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, HisRisError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed =
        if config.json { builder.json().try_init().is_ok() } else { builder.try_init().is_ok() };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    Ok(installed)
}

//! Environment variable names and process configuration.
//!
//! The sink and handler types stay decoupled from environment access; only
//! the binary reads the process environment, through [`ServerConfig`] and
//! [`LayerConfig::from_env`](crate::init::LayerConfig::from_env).

use crate::error::ConfigError;
use tracing::info;

/// Port the HTTP listener binds to, e.g. `8080`. Set by Cloud Run.
pub const PORT_ENV: &str = "PORT";

/// Port used when [`PORT_ENV`] is unset or empty.
pub const DEFAULT_PORT: u16 = 8080;

/// Mirror diagnostics to stderr in human-readable form, e.g. `true`.
pub const LOG_STDERR_ENV: &str = "LOG_STDERR";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Interpret a switch value: `1`, `true`, `yes` and `on` (any case) are set.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings for the HTTP listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    /// Build the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| Some(env_or(key, "")))
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// An unset or empty `PORT` falls back to [`DEFAULT_PORT`]; a value
    /// that is not a port number is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(PORT_ENV).filter(|v| !v.is_empty()) {
            Some(value) => {
                let port = value.trim().parse::<u16>().map_err(|source| ConfigError::InvalidPort {
                    key: PORT_ENV,
                    value: value.clone(),
                    source,
                })?;
                Ok(Self { port })
            }
            None => {
                info!(port = DEFAULT_PORT, "Defaulting to port {}", DEFAULT_PORT);
                Ok(Self::default())
            }
        }
    }
}

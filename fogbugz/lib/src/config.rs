//! Client configuration.
//!
//! Settings can be given in code or read from the environment:
//!
//! | variable | meaning |
//! |---|---|
//! | `FOGBUGZ_URL` | base URL of the installation (required) |
//! | `FOGBUGZ_TOKEN` | token from an earlier logon (optional) |
//! | `FOGBUGZ_TIMEOUT_SECS` | whole-request timeout in seconds (optional) |

use std::time::Duration;

use crate::error::ConfigError;
use crate::token::SessionToken;

/// Environment variable holding the base URL.
pub const URL_ENV: &str = "FOGBUGZ_URL";

/// Environment variable holding a previously issued token.
pub const TOKEN_ENV: &str = "FOGBUGZ_TOKEN";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "FOGBUGZ_TIMEOUT_SECS";

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("fogbugz-rs/", env!("CARGO_PKG_VERSION"));

/// Settings used to build a [`FogBugz`](crate::FogBugz) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the installation; a trailing `/` is added if missing.
    pub base_url: String,
    /// Token to start the session with, skipping `logon`.
    pub token: Option<SessionToken>,
    /// Whole-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration with defaults for everything but the URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Reads the configuration from `FOGBUGZ_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns an error if `FOGBUGZ_URL` is unset or the timeout is not a
    /// whole number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_base(None)
    }

    /// Reads the environment like [`from_env`](Self::from_env), with
    /// `base_url` taking precedence over `FOGBUGZ_URL` when given.
    ///
    /// ## Errors
    ///
    /// Returns an error if no base URL is available from either source or
    /// the timeout is not a whole number of seconds.
    pub fn from_env_with_base(base_url: Option<String>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .or_else(|| env_value(URL_ENV))
            .ok_or(ConfigError::MissingVar { name: URL_ENV })?;
        let mut config = Self::new(base_url);
        config.token = env_value(TOKEN_ENV).map(SessionToken::new);

        if let Some(raw) = env_value(TIMEOUT_ENV) {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Reads a variable, treating empty and whitespace-only values as unset.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

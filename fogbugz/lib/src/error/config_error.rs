//! Client configuration errors.

use thiserror::Error;

/// Errors while assembling a [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing required environment variable {name}")]
    MissingVar {
        /// The variable name.
        name: &'static str,
    },

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_display() {
        let err = ConfigError::MissingVar { name: "FOGBUGZ_URL" };
        assert_eq!(err.to_string(), "Missing required environment variable FOGBUGZ_URL");
    }
}

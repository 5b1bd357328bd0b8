//! Top-level client error type.

use super::{ApiError, ConnectionError, LogonError};
use thiserror::Error;

/// Top-level error type for all FogBugz client operations.
///
/// Every failure propagates to the caller as one of these variants; the
/// client never retries on its own.
///
/// ## Examples
///
/// ```rust,ignore
/// use fogbugz::FogBugzError;
///
/// fn handle_error(err: FogBugzError) {
///     match err {
///         FogBugzError::Connection(e) => eprintln!("Cannot reach FogBugz: {e}"),
///         FogBugzError::Logon(e) => eprintln!("Logon failed: {e}"),
///         FogBugzError::Api(e) => eprintln!("FogBugz rejected the command: {e}"),
///         FogBugzError::NoSuchCommand { name } => eprintln!("not a command: {name}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum FogBugzError {
    /// The service could not be reached or answered with something unusable.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The authentication flow failed.
    #[error(transparent)]
    Logon(#[from] LogonError),

    /// The service answered with an `<error>` node.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The name is reserved for internal use and is never sent as a command.
    #[error("No such attribute '{name}'")]
    NoSuchCommand {
        /// The rejected command name.
        name: String,
    },
}

impl FogBugzError {
    /// Returns the service-reported error, whether it surfaced directly or
    /// through the logon flow.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::Logon(e) => e.api_error(),
            _ => None,
        }
    }

    /// Returns `true` if this is a transport-level failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_error() {
        let err: FogBugzError = ApiError::new("33", "Command not found").into();
        assert!(matches!(err, FogBugzError::Api(_)));
        assert_eq!(err.api_error().map(ApiError::code), Some("33"));
        assert!(!err.is_connection());
    }

    #[test]
    fn test_logon_error_exposes_api_error() {
        let err: FogBugzError =
            LogonError::from(ApiError::new("1", "Incorrect password or username")).into();
        assert_eq!(err.api_error().map(ApiError::code), Some("1"));
    }

    #[test]
    fn test_connection_error_has_no_api_error() {
        let err: FogBugzError = ConnectionError::Discovery {
            url: "https://example.com/api.xml".to_string(),
            reason: "missing <url>".to_string(),
        }
        .into();
        assert!(err.is_connection());
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_no_such_command_display() {
        let err = FogBugzError::NoSuchCommand {
            name: "__init__".to_string(),
        };
        assert_eq!(err.to_string(), "No such attribute '__init__'");
    }
}

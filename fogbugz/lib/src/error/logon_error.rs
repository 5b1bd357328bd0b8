//! Authentication flow errors.

use thiserror::Error;

use super::ApiError;

/// FogBugz error code for a wrong email or password.
const INVALID_CREDENTIALS_CODE: u32 = 1;

/// FogBugz error code when the email matches more than one person.
const AMBIGUOUS_LOGON_CODE: u32 = 2;

/// Errors raised by [`FogBugz::logon`](crate::FogBugz::logon).
///
/// The wrapped [`ApiError`] is kept so the service's code and message stay
/// available to the caller.
#[derive(Debug, Error)]
pub enum LogonError {
    /// The email or password was rejected.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(ApiError),

    /// The email matched several accounts.
    #[error("Ambiguous logon: {0}")]
    Ambiguous(ApiError),

    /// Any other service error during logon.
    #[error("Logon rejected: {0}")]
    Rejected(ApiError),

    /// The logon succeeded but no `<token>` came back.
    #[error("Logon response did not contain a token")]
    MissingToken,
}

impl LogonError {
    /// Returns the underlying service error, if there is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::InvalidCredentials(e) | Self::Ambiguous(e) | Self::Rejected(e) => Some(e),
            Self::MissingToken => None,
        }
    }
}

impl From<ApiError> for LogonError {
    fn from(err: ApiError) -> Self {
        match err.code_number() {
            Some(INVALID_CREDENTIALS_CODE) => Self::InvalidCredentials(err),
            Some(AMBIGUOUS_LOGON_CODE) => Self::Ambiguous(err),
            _ => Self::Rejected(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_by_code() {
        let bad = LogonError::from(ApiError::new("1", "Incorrect password or username"));
        assert!(matches!(bad, LogonError::InvalidCredentials(_)));

        let ambiguous = LogonError::from(ApiError::new("2", "Ambiguous Logon"));
        assert!(matches!(ambiguous, LogonError::Ambiguous(_)));

        let other = LogonError::from(ApiError::new("17", "Database error"));
        assert!(matches!(other, LogonError::Rejected(_)));
    }

    #[test]
    fn test_keeps_message() {
        let err = LogonError::from(ApiError::new("1", "Incorrect password or username"));
        assert_eq!(
            err.api_error().map(ApiError::message),
            Some("Incorrect password or username")
        );
        assert!(err.to_string().contains("Incorrect password"));
    }

    #[test]
    fn test_missing_token() {
        assert!(LogonError::MissingToken.api_error().is_none());
    }
}

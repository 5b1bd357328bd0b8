//! Errors reported by the FogBugz service.

use thiserror::Error;

/// An `<error code="...">message</error>` node returned for a command.
///
/// The code and message are carried verbatim; the client does not
/// interpret them beyond the logon flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error Code {code}: {message}")]
pub struct ApiError {
    code: String,
    message: String,
}

impl ApiError {
    /// Creates an API error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The `code` attribute of the error node.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The text content of the error node.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error code as a number, when it is one.
    pub fn code_number(&self) -> Option<u32> {
        self.code.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ApiError::new("33", "Command not found");
        assert_eq!(err.to_string(), "Error Code 33: Command not found");
    }

    #[test]
    fn test_code_number() {
        assert_eq!(ApiError::new("33", "x").code_number(), Some(33));
        assert_eq!(ApiError::new("", "x").code_number(), None);
    }
}

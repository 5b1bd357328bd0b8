//! Session token type.

use std::fmt;

/// Opaque credential issued by `logon` and attached to later commands.
///
/// The token is stored as the exact text the server sent, whether that
/// arrived as plain text or as CDATA. `Debug` output is redacted so the
/// token does not leak into logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as text, as it is sent in the `token` field.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token's canonical byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::new("s3cr3t");
        assert_eq!(format!("{token:?}"), "SessionToken(***)");
    }

    #[test]
    fn test_bytes() {
        let token: SessionToken = "abc".into();
        assert_eq!(token.as_bytes(), b"abc");
        assert_eq!(token.as_str(), "abc");
    }
}

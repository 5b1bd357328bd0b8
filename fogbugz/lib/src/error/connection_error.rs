//! Transport and response-shape errors.

use thiserror::Error;

use super::XmlError;

/// Errors reaching the FogBugz service or reading what it sent back.
///
/// Every variant records the URL that was being requested.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The URL could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// The parse failure.
        source: url::ParseError,
    },

    /// The HTTP exchange failed (unreachable host, reset, timeout, ...).
    #[error("Request to {url} failed: {source}")]
    Request {
        /// The requested URL.
        url: String,
        /// The transport failure.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The body was not a usable XML `<response>` document.
    #[error("Malformed response from {url}: {source}")]
    MalformedResponse {
        /// The requested URL.
        url: String,
        /// What was wrong with the document.
        source: XmlError,
    },

    /// The descriptor document did not advertise a command endpoint.
    #[error(
        "Could not discover the FogBugz API at {url}. Either this installation does not \
         support the API or the URL is incorrect: {reason}"
    )]
    Discovery {
        /// The descriptor URL.
        url: String,
        /// Why discovery failed.
        reason: String,
    },
}

impl ConnectionError {
    /// The URL the client was trying to reach.
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Request { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::MalformedResponse { url, .. }
            | Self::Discovery { url, .. } => url,
        }
    }

    /// Returns the HTTP status code if the server answered with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = ConnectionError::InvalidUrl {
            url: "not a url/".to_string(),
            source,
        };
        assert_eq!(err.url(), "not a url/");
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_status_code_extraction() {
        let err = ConnectionError::HttpStatus {
            url: "https://example.com/api.asp".to_string(),
            status: 503,
        };
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "HTTP 503 from https://example.com/api.asp");

        let malformed = ConnectionError::MalformedResponse {
            url: "https://example.com/api.asp".to_string(),
            source: XmlError::MissingElement {
                name: "response".to_string(),
            },
        };
        assert_eq!(malformed.status_code(), None);
    }

    #[test]
    fn test_discovery_mentions_url() {
        let err = ConnectionError::Discovery {
            url: "https://example.com/api.xml".to_string(),
            reason: "no <url> element".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("https://example.com/api.xml"));
        assert!(display.contains("no <url> element"));
    }
}

//! The `api.xml` descriptor document.

use super::Response;
use crate::error::XmlError;

/// What `api.xml` advertises about an installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDescriptor {
    /// Relative path of the command endpoint, e.g. `api.asp?`.
    pub url: String,
    /// API version spoken by the server.
    pub version: Option<u32>,
    /// Oldest API version the server still accepts.
    pub min_version: Option<u32>,
}

impl ApiDescriptor {
    /// Reads the descriptor out of a parsed `api.xml` response.
    ///
    /// ## Errors
    ///
    /// Returns an error if the `<url>` element is missing or empty.
    pub fn from_response(response: &Response) -> Result<Self, XmlError> {
        let url = response
            .text_of("url")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| XmlError::missing("url"))?;

        Ok(Self {
            url,
            version: response.text_of("version").and_then(|v| v.parse().ok()),
            min_version: response.text_of("minversion").and_then(|v| v.parse().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_descriptor() {
        let response = Response::parse(
            b"<response><version>8</version><minversion>1</minversion><url>api.asp?</url></response>",
        )
        .unwrap();
        let descriptor = ApiDescriptor::from_response(&response).unwrap();
        assert_eq!(
            descriptor,
            ApiDescriptor {
                url: "api.asp?".to_string(),
                version: Some(8),
                min_version: Some(1),
            }
        );
    }

    #[test]
    fn test_url_only() {
        let response = Response::parse(b"<response><url><![CDATA[api.asp?]]></url></response>").unwrap();
        let descriptor = ApiDescriptor::from_response(&response).unwrap();
        assert_eq!(descriptor.url, "api.asp?");
        assert_eq!(descriptor.version, None);
    }

    #[test]
    fn test_missing_url() {
        let response = Response::parse(b"<response><version>8</version></response>").unwrap();
        let result = ApiDescriptor::from_response(&response);
        assert!(matches!(result, Err(XmlError::MissingElement { .. })));
    }
}

//! Endpoint discovery via `api.xml`.

use reqwest::Client;
use tracing::{info, instrument, Span};
use url::Url;

use crate::error::ConnectionError;
use crate::response::{ApiDescriptor, Response};

/// Well-known location of the descriptor document, relative to the base URL.
pub const DESCRIPTOR_PATH: &str = "api.xml";

/// Adds the trailing separator the endpoint path is appended to.
pub(crate) fn normalize_base(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Fetches `api.xml` below `base_url` and resolves the command endpoint.
///
/// The advertised path is appended textually, so a value like `api.asp?`
/// keeps its trailing `?`.
#[instrument(
    name = "fogbugz_discovery",
    skip(http),
    fields(
        http.url = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        otel.kind = "client",
    )
)]
pub(crate) async fn discover(
    http: &Client,
    base_url: &str,
) -> Result<(Url, ApiDescriptor), ConnectionError> {
    let base = normalize_base(base_url);
    let descriptor_url = format!("{base}{DESCRIPTOR_PATH}");
    Span::current().record("http.url", descriptor_url.as_str());

    let url = Url::parse(&descriptor_url).map_err(|source| ConnectionError::InvalidUrl {
        url: descriptor_url.clone(),
        source,
    })?;

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|source| ConnectionError::Request {
            url: descriptor_url.clone(),
            source,
        })?;

    let status = response.status();
    Span::current().record("http.status_code", status.as_u16());
    if !status.is_success() {
        return Err(ConnectionError::HttpStatus {
            url: descriptor_url,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| ConnectionError::Request {
            url: descriptor_url.clone(),
            source,
        })?;

    let document = Response::parse(&body).map_err(|source| ConnectionError::MalformedResponse {
        url: descriptor_url.clone(),
        source,
    })?;

    let descriptor =
        ApiDescriptor::from_response(&document).map_err(|e| ConnectionError::Discovery {
            url: descriptor_url.clone(),
            reason: e.to_string(),
        })?;

    let endpoint_text = format!("{base}{}", descriptor.url);
    let endpoint = Url::parse(&endpoint_text).map_err(|source| ConnectionError::InvalidUrl {
        url: endpoint_text.clone(),
        source,
    })?;

    info!(
        endpoint = %endpoint,
        version = ?descriptor.version,
        "discovered FogBugz API endpoint"
    );
    Ok((endpoint, descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base("https://x.com"), "https://x.com/");
        assert_eq!(normalize_base("https://x.com/"), "https://x.com/");
        assert_eq!(normalize_base("https://x.com/fogbugz"), "https://x.com/fogbugz/");
        assert_eq!(normalize_base(" https://x.com "), "https://x.com/");
    }
}

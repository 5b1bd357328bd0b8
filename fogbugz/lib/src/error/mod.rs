//! Layered error types for the FogBugz client.
//!
//! The hierarchy separates the three ways a call can fail:
//! - [`FogBugzError`] - Top-level error type for every client operation
//! - [`ConnectionError`] - Transport failures and unusable responses
//! - [`LogonError`] - Failures of the authentication flow
//! - [`ApiError`] - Errors reported by the service for a dispatched command
//! - [`XmlError`] - Failures while reading an XML document
//! - [`ConfigError`] - Unusable client configuration

mod api_error;
mod config_error;
mod connection_error;
mod fogbugz_error;
mod logon_error;
mod xml_error;

pub use api_error::ApiError;
pub use config_error::ConfigError;
pub use connection_error::ConnectionError;
pub use fogbugz_error::FogBugzError;
pub use logon_error::LogonError;
pub use xml_error::XmlError;

//! Client for the FogBugz XML API.
//!
//! The client discovers the command endpoint from `api.xml`, keeps a session
//! token, and sends any command by name as a `multipart/form-data` POST.
//! Responses come back as a parsed XML tree; `<error>` responses become
//! typed errors.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use fogbugz::FogBugz;
//!
//! let mut client = FogBugz::connect("https://example.fogbugz.com").await?;
//! client.logon("me@example.com", "secret").await?;
//!
//! let cases = client.search("assignedto:me", &["sTitle", "ixBug"]).await?;
//! for case in cases.child("cases").into_iter().flat_map(|c| c.children("case")) {
//!     let title = case.child("sTitle").map(|t| t.text()).unwrap_or_default();
//!     println!("{}: {title}", case.attribute("ixBug").unwrap_or("?"));
//! }
//!
//! client.logoff().await?;
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod multipart;
pub mod response;
pub mod token;

pub use client::{FogBugz, FogBugzBuilder, Session};
pub use command::{Attachment, Command, CommandRequest, FormFields};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ConnectionError, FogBugzError, LogonError, XmlError};
pub use multipart::MultipartBody;
pub use response::{ApiDescriptor, Response, XmlElement, XmlNode};
pub use token::SessionToken;

//! FogBugz client module.
//!
//! [`FogBugz`] discovers the command endpoint on construction, keeps the
//! [`Session`] state and dispatches commands by name.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use fogbugz::FogBugz;
//!
//! let mut client = FogBugz::connect("https://example.fogbugz.com").await?;
//! client.logon("me@example.com", "password").await?;
//!
//! // Any command the server knows can be called by name
//! let response = client
//!     .invoke("search", [("q", "assignedto:me"), ("cols", "sTitle")], Vec::new())
//!     .await?;
//! for case in response.child("cases").into_iter().flat_map(|c| c.children("case")) {
//!     println!("{}: {}", case.attribute("ixBug").unwrap_or("?"), case.text());
//! }
//!
//! client.logoff().await?;
//! ```

mod discovery;
mod executor;
mod session;

pub use discovery::DESCRIPTOR_PATH;
pub use executor::{FogBugz, FogBugzBuilder};
pub use session::Session;

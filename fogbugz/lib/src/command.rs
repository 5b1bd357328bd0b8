//! Command descriptors and per-call requests.
//!
//! FogBugz exposes an open-ended set of commands. Rather than a method per
//! command, a [`Command`] is just a validated name; a [`CommandRequest`]
//! carries the fields and attachments for one call.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let search = client.command("search")?;
//! let response = client
//!     .execute(search.request().arg("q", "assignedto:me").arg("max", 20))
//!     .await?;
//! ```

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::FogBugzError;
use crate::token::SessionToken;

/// Command names starting with this prefix are reserved for internal use.
pub const RESERVED_PREFIX: &str = "__";

/// Field carrying the command name.
pub const CMD_FIELD: &str = "cmd";

/// Field carrying the session token.
pub const TOKEN_FIELD: &str = "token";

/// Reserved argument name for attachments; never sent as a plain field.
pub const FILES_ARGUMENT: &str = "Files";

/// Field recording how many files are attached.
pub const FILE_COUNT_FIELD: &str = "nFileCount";

/// Field values that are redacted from `Debug` output.
const SECRET_FIELDS: [&str; 2] = ["password", TOKEN_FIELD];

/// Ordered form fields.
///
/// Inserting an existing name replaces its value in place, so the position
/// of the first insertion is kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, coercing the value to text.
    pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        let name = name.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Looks up a field value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Debug for FormFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(key, value)| {
                let shown = if SECRET_FIELDS.contains(&key.as_str()) {
                    "***"
                } else {
                    value.as_str()
                };
                (key, shown)
            }))
            .finish()
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// A file uploaded alongside a command.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content: Bytes,
}

impl Attachment {
    /// Creates an attachment from in-memory bytes.
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Reads an attachment to the end of a reader.
    ///
    /// ## Errors
    ///
    /// Returns any I/O error raised by the reader.
    pub fn from_reader(filename: impl Into<String>, mut reader: impl Read) -> std::io::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(Self::new(filename, content))
    }

    /// Reads a file from disk, naming the attachment after the file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = tokio::fs::read(path).await?;
        Ok(Self::new(filename, content))
    }

    /// The original filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The raw file bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("len", &self.content.len())
            .finish()
    }
}

/// A validated command name.
///
/// Cheap to clone; the client keeps one per name it has seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    name: Arc<str>,
}

impl Command {
    /// Validates a command name.
    ///
    /// ## Errors
    ///
    /// Returns [`FogBugzError::NoSuchCommand`] for empty names and names
    /// starting with [`RESERVED_PREFIX`].
    pub fn new(name: &str) -> Result<Self, FogBugzError> {
        if name.is_empty() || name.starts_with(RESERVED_PREFIX) {
            return Err(FogBugzError::NoSuchCommand {
                name: name.to_owned(),
            });
        }
        Ok(Self { name: name.into() })
    }

    /// The command name sent in the `cmd` field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts a request for this command.
    pub fn request(&self) -> CommandRequest {
        CommandRequest {
            command: self.clone(),
            fields: FormFields::new(),
            files: Vec::new(),
        }
    }
}

/// The fields and files for a single call of a [`Command`].
#[derive(Debug, Clone)]
pub struct CommandRequest {
    command: Command,
    fields: FormFields,
    files: Vec<Attachment>,
}

impl CommandRequest {
    /// Adds a field. Any displayable value is accepted.
    pub fn arg(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Adds several fields.
    pub fn args<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
        self
    }

    /// Attaches a file.
    pub fn file(mut self, attachment: Attachment) -> Self {
        self.files.push(attachment);
        self
    }

    /// Attaches several files.
    pub fn files(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.files.extend(attachments);
        self
    }

    /// The command being called.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The caller's fields.
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// The attached files.
    pub fn attachments(&self) -> &[Attachment] {
        &self.files
    }

    /// Produces the wire fields: caller fields minus `Files`, then `cmd`
    /// and `token`.
    pub(crate) fn into_form(self, token: Option<&SessionToken>) -> (FormFields, Vec<Attachment>) {
        let mut fields = self.fields;
        if fields.remove(FILES_ARGUMENT).is_some() {
            tracing::debug!("dropped reserved `{FILES_ARGUMENT}` field; attach files instead");
        }
        fields.insert(CMD_FIELD, self.command.name());
        if let Some(token) = token {
            fields.insert(TOKEN_FIELD, token.as_str());
        }
        (fields, self.files)
    }
}

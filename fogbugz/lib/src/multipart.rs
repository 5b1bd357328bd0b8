//! `multipart/form-data` encoding for command requests.
//!
//! FogBugz expects text fields and raw file payloads interleaved in a single
//! body of a fixed shape, so the body is assembled by hand:
//!
//! ```text
//! --<boundary>\r\n
//! Content-disposition: form-data; name="cmd"\r\n
//! \r\n
//! search\r\n
//! --<boundary>\r\n
//! Content-disposition: form-data; name="File1"; filename="trace.log"\r\n
//! Content-type: application/octet-stream\r\n
//! \r\n
//! <raw bytes>\r\n
//! --<boundary>--\r\n
//! ```

use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::command::{Attachment, FormFields, FILE_COUNT_FIELD};

/// Length of generated boundary tokens.
const BOUNDARY_LEN: usize = 32;

const CRLF: &[u8] = b"\r\n";

/// An encoded request body with the headers it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    /// The boundary token separating the parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Value for the `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the body, returning the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.body)
    }
}

/// Encodes fields and files with a fresh random boundary.
///
/// When files are present an `nFileCount` field is added before encoding.
/// The boundary is regenerated until it appears nowhere in the content.
pub fn encode(fields: &FormFields, files: &[Attachment]) -> MultipartBody {
    let boundary = loop {
        let candidate = random_boundary();
        if !collides(&candidate, fields, files) {
            break candidate;
        }
    };
    encode_with_boundary(fields, files, &boundary)
}

/// Encodes fields and files with a caller-chosen boundary.
///
/// The output is fully determined by the inputs.
pub fn encode_with_boundary(fields: &FormFields, files: &[Attachment], boundary: &str) -> MultipartBody {
    let mut fields = fields.clone();
    if !files.is_empty() {
        fields.insert(FILE_COUNT_FIELD, files.len());
    }

    let mut body = Vec::new();
    for (name, value) in fields.iter() {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(CRLF);
    }

    for (index, file) in files.iter().enumerate() {
        let slot = index + 1;
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-disposition: form-data; name=\"File{slot}\"; filename=\"{}\"\r\n\
                 Content-type: application/octet-stream\r\n\r\n",
                file.filename()
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.content());
        body.extend_from_slice(CRLF);
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody {
        boundary: boundary.to_owned(),
        body,
    }
}

fn random_boundary() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect()
}

fn collides(boundary: &str, fields: &FormFields, files: &[Attachment]) -> bool {
    let needle = boundary.as_bytes();
    fields
        .iter()
        .any(|(name, value)| contains(name.as_bytes(), needle) || contains(value.as_bytes(), needle))
        || files
            .iter()
            .any(|file| contains(file.filename().as_bytes(), needle) || contains(file.content(), needle))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

//! Simple multipart form encoding purpose built for the Paperless document
//! upload endpoint.

use std::path::Path;

/// MIME type used when the file extension gives no hint.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A single file field, the only part a document upload carries.
#[derive(Debug)]
pub struct FilePart<'a> {
    /// Form field name
    pub name: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub content: &'a [u8],
}

impl FilePart<'_> {
    /// Encodes a multipart/form-data body holding just this part, and returns
    /// it along with the `Content-Type` header value (including the boundary).
    pub fn encode(&self, boundary: &str) -> Body {
        let mut body = Vec::with_capacity(self.content.len() + 256);

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

        body.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        body.extend_from_slice(self.name.as_bytes());
        body.extend_from_slice(b"\"; filename=\"");
        body.extend_from_slice(self.filename.as_bytes());
        body.extend_from_slice(b"\"\r\n");

        body.extend_from_slice(b"Content-Type: ");
        body.extend_from_slice(self.content_type.as_bytes());
        body.extend_from_slice(b"\r\n\r\n");

        body.extend_from_slice(self.content);
        body.extend_from_slice(b"\r\n");

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Body {
            body,
            content_type: format!("multipart/form-data; boundary={boundary}"),
        }
    }
}

/// Represents the built multipart body and its associated Content-Type header.
#[derive(Debug)]
pub struct Body {
    /// The raw bytes of the multipart/form-data body.
    pub body: Vec<u8>,
    /// The value for the `Content-Type` header, e.g., `"multipart/form-data; boundary=..."`.
    pub content_type: String,
}

/// Generates a random boundary: 128 bits rendered as 32 lowercase hex chars.
pub fn generate_boundary() -> String {
    let bits: u128 = rand::random();
    format!("{bits:032x}")
}

/// Infers a MIME type from a filename extension.
///
/// Uses the standard extension table from `mime_guess`. Defaults to
/// `application/octet-stream` for unknown, missing, or non-UTF8 extensions.
pub fn mime_from_filename<P: AsRef<Path>>(path: P) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(FALLBACK_MIME)
}

// --- Tests ---

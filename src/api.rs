use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::multipart;

#[cfg(test)]
mod tests;

/// Fixed path of the Paperless document ingestion endpoint.
pub const POST_DOCUMENT_PATH: &str = "/api/documents/post_document/";

/// Name of the multipart field carrying the document.
const DOCUMENT_FIELD: &str = "document";

/// Resolved connection settings for the Paperless API.
///
/// Built once at startup and passed by reference to everything downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the server, without trailing slash
    pub endpoint: String,
    /// API token sent as `Authorization: Token {key}`
    pub key: String,
    /// API version sent in the `Accept` header
    pub version: u32,
}

impl ApiConfig {
    pub fn new(endpoint: &str, key: String, version: u32) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            version,
        }
    }

    /// Full URL of the document upload endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}{POST_DOCUMENT_PATH}", self.endpoint)
    }
}

/// Errors that can occur while building an upload request.
#[derive(Debug)]
pub enum BuildError {
    /// The endpoint does not use an `http:` or `https:` scheme
    InvalidConfig(String),
    /// The file could not be opened or read
    FileAccess { path: PathBuf, source: io::Error },
    /// The path does not name a file
    InvalidFileName(PathBuf),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidConfig(url) => write!(
                f,
                "URL must start with 'http:' or 'https:', got '{url}'"
            ),
            BuildError::FileAccess { path, source } => {
                write!(f, "Failed to read file {}: {source}", path.display())
            }
            BuildError::InvalidFileName(path) => {
                write!(f, "Not a file name: {}", path.display())
            }
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BuildError::FileAccess { source, .. } => Some(source),
            BuildError::InvalidConfig(_) | BuildError::InvalidFileName(_) => {
                None
            }
        }
    }
}

/// A fully-formed document upload: target URL, headers, and body bytes.
#[derive(Debug)]
pub struct UploadRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    pub boundary: String,
    /// Base name of the uploaded file
    pub filename: String,
}

impl UploadRequest {
    /// Build the upload request for `path` with a fresh random boundary.
    pub fn build(api: &ApiConfig, path: &Path) -> Result<Self, BuildError> {
        Self::build_with_boundary(api, path, multipart::generate_boundary())
    }

    /// Build the upload request for `path` using the given boundary.
    ///
    /// The endpoint scheme is validated before the file is touched. The file
    /// is read whole into memory and closed before this returns.
    pub fn build_with_boundary(
        api: &ApiConfig,
        path: &Path,
        boundary: String,
    ) -> Result<Self, BuildError> {
        let url = api.upload_url();
        if !(url.starts_with("http:") || url.starts_with("https:")) {
            return Err(BuildError::InvalidConfig(api.endpoint.clone()));
        }

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| BuildError::InvalidFileName(path.to_path_buf()))?;
        let content_type = multipart::mime_from_filename(path);

        let content =
            std::fs::read(path).map_err(|source| BuildError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        let multipart::Body {
            body,
            content_type: body_content_type,
        } = multipart::FilePart {
            name: DOCUMENT_FIELD,
            filename: &filename,
            content_type,
            content: &content,
        }
        .encode(&boundary);

        let headers = vec![
            ("Accept", format!("application/json; version={}", api.version)),
            ("Authorization", format!("Token {}", api.key)),
            ("Connection", "keep-alive".to_string()),
            ("Content-Type", body_content_type),
            ("Content-Length", body.len().to_string()),
        ];

        Ok(Self {
            url,
            headers,
            body,
            boundary,
            filename,
        })
    }

    /// Look up a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Result of sending one upload request.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered with a 2xx status
    Success { status: u16, body: String },
    /// The server answered with a non-success status
    HttpFailure {
        status: u16,
        reason: String,
        body: String,
    },
    /// No HTTP response was received (DNS, connect, I/O, protocol error)
    TransportFailure { reason: String },
}

impl Outcome {
    /// The consume task id Paperless returns for an accepted document.
    ///
    /// The success body is a bare JSON string, e.g. `"0f3c…"`.
    pub fn task_id(&self) -> Option<String> {
        match self {
            Outcome::Success { body, .. } => {
                serde_json::from_str::<String>(body).ok()
            }
            _ => None,
        }
    }

    /// Convert into a `Result`, yielding the success body.
    pub fn into_result(self) -> Result<String, UploadError> {
        match self {
            Outcome::Success { body, .. } => Ok(body),
            Outcome::HttpFailure {
                status,
                reason,
                body,
            } => Err(UploadError::Http {
                status,
                reason,
                body,
            }),
            Outcome::TransportFailure { reason } => {
                Err(UploadError::Transport { reason })
            }
        }
    }
}

/// A failed upload.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadError {
    Http {
        status: u16,
        reason: String,
        body: String,
    },
    Transport {
        reason: String,
    },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Http { status, reason, .. } => {
                write!(f, "HTTP Error {status}: {reason}")
            }
            UploadError::Transport { reason } => {
                write!(f, "URL Error: {reason}")
            }
        }
    }
}

impl Error for UploadError {}

//! Content sources for inline and attached email parts.
//!
//! A source is read at dispatch time, not when the email is built, and may be
//! read any number of times.

use std::fmt;
use std::path::PathBuf;

use lettre::message::header::ContentType;

use crate::error::ContentError;

const OCTET_STREAM: &str = "application/octet-stream";

/// A re-readable byte source backing a named email part.
pub trait ContentSource: fmt::Debug + Send + Sync {
    /// Read the full content.
    fn read(&self) -> std::io::Result<Vec<u8>>;

    /// Explicit MIME type. `None` lets the part name decide.
    fn content_type(&self) -> Option<&str> {
        None
    }
}

/// In-memory content.
#[derive(Clone, PartialEq, Eq)]
pub struct BytesSource {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Override the MIME type guessed from the part name.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

// Content may be large or sensitive; only the size is shown.
impl fmt::Debug for BytesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BytesSource")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl ContentSource for BytesSource {
    fn read(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Content read from a file when the email is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    content_type: Option<String>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }

    /// Override the MIME type guessed from the part name.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl ContentSource for FileSource {
    fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Resolve the MIME type of a named part.
///
/// An explicit type on the source wins; otherwise the type is guessed from
/// the part name, falling back to `application/octet-stream`.
pub fn resolve_content_type(
    name: &str,
    source: &dyn ContentSource,
) -> Result<ContentType, ContentError> {
    let raw = match source.content_type() {
        Some(explicit) => explicit.to_string(),
        None => mime_guess::from_path(name)
            .first()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
    };
    ContentType::parse(&raw).map_err(|_| ContentError::ContentType(raw))
}

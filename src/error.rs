//! Error types for mail-dispatch.

use std::fmt;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to create SMTP transport for {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// Which mapping a failing content part came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Inline,
    Attachment,
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartKind::Inline => f.write_str("inline attachment"),
            PartKind::Attachment => f.write_str("attachment"),
        }
    }
}

/// Failure to turn a content source into a MIME part.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid content type {0:?}")]
    ContentType(String),

    #[error("Content could not be base64 encoded")]
    Encoding,
}

/// Errors raised while assembling or sending an [`Email`](crate::email::Email).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to add {kind} '{name}': {source}")]
    Attachment {
        kind: PartKind,
        name: String,
        #[source]
        source: ContentError,
    },

    #[error("Invalid {field} address '{address}': {source}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Transport failed to send email: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Dispatch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DispatchError {
    /// True when the failure happened while attaching content rather than
    /// while talking to the transport.
    pub fn is_attachment(&self) -> bool {
        matches!(self, DispatchError::Attachment { .. })
    }
}

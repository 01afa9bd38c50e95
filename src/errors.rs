use thiserror::Error;

/// Error type covering record-store failures surfaced to callers.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl VaultError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        VaultError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        VaultError::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        VaultError::Storage(message.into())
    }
}

/// Decode-level failure for a single block. Never escapes the decoder;
/// malformed blocks degrade to a skip count surfaced alongside the records.
#[derive(Debug, Error)]
#[error("malformed `{kind}` block `{id}`: {reason}")]
pub struct MalformedBlock {
    pub kind: String,
    pub id: String,
    pub reason: String,
}

impl MalformedBlock {
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

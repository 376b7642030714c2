use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed upload path {url}: {reason}")]
    MalformedUploadPath { url: String, reason: String },
}

impl DecodeError {
    pub(crate) fn malformed(url: &str, reason: impl Into<String>) -> Self {
        DecodeError::MalformedUploadPath {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// A poll attempt against one of the queue sources did not succeed.
///
/// Never surfaced as a fault; it only feeds status derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source fetch failed: {message}")]
pub struct SourceFetchFailure {
    pub message: String,
}

impl SourceFetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

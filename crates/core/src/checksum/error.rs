//! Checksum error types.

use thiserror::Error;

/// Errors raised while deriving checksums from a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// The payload is not a JSON document.
    #[error("Payload is not valid JSON: {0}")]
    MalformedPayload(String),

    /// A report could not be serialized into a payload.
    #[error("Report could not be serialized: {0}")]
    Serialization(String),
}

impl ChecksumError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::Serialization(_) => "SERIALIZATION_FAILED",
        }
    }
}

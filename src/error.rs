//! Error types for regs-harvest
//!
//! Upstream failures (rate limits, 5xx, transport errors) are absorbed by the
//! fetcher's retry policy and never show up here; by the time an [`Error`]
//! reaches a caller it describes something the retry loop could not fix:
//! bad configuration, a malformed payload, a local I/O problem, or an
//! attachment that could not be decoded.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for regs-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for regs-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.api_keys")
        key: Option<String>,
    },

    /// Caller supplied an unusable value (e.g. an empty docket id)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The API answered 200 but the body did not have the expected shape
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse {
        /// Request URL (without query string)
        url: String,
        /// Decoder message
        reason: String,
    },

    /// Attachment download or text extraction failed
    #[error("attachment error: {0}")]
    Decode(#[from] DecodeError),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific setting
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Attachment download and extraction errors
///
/// All of these are non-fatal for a harvest run: the resolver logs them and
/// moves on to the next file-format entry or attachment.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Attachment could not be downloaded
    #[error("failed to download {url}: {reason}")]
    Download {
        /// Attachment URL
        url: String,
        /// The reason the download failed
        reason: String,
    },

    /// PDF could not be parsed
    #[error("failed to extract text from PDF {path}: {reason}")]
    Pdf {
        /// Local path of the downloaded file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// DOCX could not be parsed
    #[error("failed to extract text from DOCX {path}: {reason}")]
    Docx {
        /// Local path of the downloaded file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Document parsed but contained no usable text
    #[error("no text found in {path}")]
    Empty {
        /// Local path of the downloaded file
        path: PathBuf,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_key() {
        let err = Error::config("no API keys configured", "api.api_keys");
        match &err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("api.api_keys")),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "configuration error: no API keys configured"
        );
    }

    #[test]
    fn decode_error_converts_into_error() {
        let err: Error = DecodeError::Empty {
            path: PathBuf::from("/tmp/a.pdf"),
        }
        .into();
        assert!(matches!(err, Error::Decode(DecodeError::Empty { .. })));
        assert_eq!(err.to_string(), "attachment error: no text found in /tmp/a.pdf");
    }

    #[test]
    fn io_error_converts_into_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

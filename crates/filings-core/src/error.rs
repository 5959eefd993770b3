//! Error types for filings operations.
//!
//! This module defines [`FilingsError`] which covers all error cases that can occur
//! when fetching archive resources, parsing filing documents, or handing records
//! to the storage collaborators.

use thiserror::Error;

/// Errors that can occur during ingestion operations.
#[derive(Error, Debug)]
pub enum FilingsError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The archive answered with a non-success status that is not worth retrying.
    #[error("HTTP {status} for {url}")]
    Http {
        /// HTTP status code returned by the archive.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// Every attempt allowed by the retry budget failed.
    #[error("Failed to fetch {url} after {attempts} attempts")]
    FetchExhausted {
        /// The URL that was requested.
        url: String,
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The archive kept throttling the request past the configured number of waits.
    #[error("Throttled by the archive on {url} after {waits} forced waits")]
    Throttled {
        /// The URL that was requested.
        url: String,
        /// Number of server-requested waits that were honoured.
        waits: u32,
    },

    /// Error parsing a payload or document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error interacting with the object store.
    #[error("Object store error: {0}")]
    Store(String),

    /// Error interacting with the record sink.
    #[error("Record sink error: {0}")]
    Sink(String),

    /// The requested entity or filing was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FilingsError {
    /// Returns true if the error is worth retrying with backoff.
    ///
    /// Connection-level failures and server-side (5xx) statuses are transient;
    /// client errors and parse failures are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias using [`FilingsError`].
pub type Result<T> = std::result::Result<T, FilingsError>;

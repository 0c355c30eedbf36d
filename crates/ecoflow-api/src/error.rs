//! Error types for the EcoFlow API client.

use thiserror::Error;

/// Faults that prevented a usable answer from the API.
///
/// An API that answers with a non-success `code` is *not* an error; that is
/// reported as [`ReadingOutcome::Failed`](crate::ReadingOutcome::Failed) or as
/// a missing device.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and a body we could not decode.
    #[error("EcoFlow API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the JSON envelope we expected.
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured host is not a valid base URL.
    #[error("Invalid API host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

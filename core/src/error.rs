//! Error types for the character API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the detail screen's "not
//! found" state is the common case for a bad id. All other non-2xx responses
//! land in `HttpError` with the raw status code and body for debugging.
//! Controllers collapse every variant into a single "fetch failed" log line.

use thiserror::Error;

/// Errors returned by `CharacterClient` parse methods and by fetchers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-200 status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

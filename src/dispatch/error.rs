//! Error taxonomy for message dispatch.

use thiserror::Error;

/// Failures of one dispatch attempt.
///
/// None of these are retried automatically; the session converts them into
/// a visible system message and stays interactive.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The endpoint answered with a non-success transport status.
    #[error("HTTP error! status: {status}")]
    Transport {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The endpoint answered 2xx but reported a failure in the body.
    #[error("{message}")]
    Remote {
        /// Failure text reported by the assistant.
        message: String,
    },

    /// No response was obtained at all.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response body was not valid JSON.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

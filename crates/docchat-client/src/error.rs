//! Failure shapes at the service boundary.

use thiserror::Error;

/// A failed call to the external document service.
///
/// The closed set of shapes the normalizer has to deal with: a non-2xx
/// response that may carry a structured explanation, a connection-level
/// failure, or a 2xx body that did not match the wire contract.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-2xx response. `error` and `detail` are the optional structured
    /// fields the backend may attach to the failure body.
    #[error("server error (status {status})")]
    Server {
        status: u16,
        error: Option<String>,
        detail: Option<String>,
    },

    /// The request never produced a response (connection refused, DNS
    /// failure, broken stream).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Transport-level failure from a reqwest error.
    pub fn transport(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

//! Error normalizer: one display string out of any service failure.

use crate::error::ServiceError;

/// Map a service failure to a single user-facing message.
///
/// Total over its input. The fallback chain runs from most specific to
/// least: a backend-authored `error` field wins over `detail`, which wins
/// over the transport-level message, which wins over the caller-supplied
/// generic fallback ("Upload failed" / "Ask failed"). Backend explanations
/// therefore always take precedence over generic transport errors.
pub fn normalize(failure: &ServiceError, fallback: &str) -> String {
    match failure {
        ServiceError::Server {
            error: Some(msg), ..
        } if !msg.trim().is_empty() => msg.clone(),
        ServiceError::Server {
            detail: Some(msg), ..
        } if !msg.trim().is_empty() => msg.clone(),
        // No structured fields: the status line is the closest thing to a
        // transport-level message for an HTTP-level failure.
        ServiceError::Server { .. } => failure.to_string(),
        ServiceError::Transport(msg) | ServiceError::Malformed(msg)
            if !msg.trim().is_empty() =>
        {
            msg.clone()
        }
        _ => fallback.to_string(),
    }
}

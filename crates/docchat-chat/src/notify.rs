//! Out-of-band notification channel.
//!
//! The orchestrators push user-facing messages (upload results, normalized
//! failures) through this trait; the presentation layer decides how to show
//! them.

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that logs via tracing; the default when no richer channel is
/// wired up.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(message = %message, "Notification shown");
    }
}

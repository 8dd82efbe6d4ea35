use tracing::warn;

/// Title used for every evaluation-failure notification.
pub const ERROR_TITLE: &str = "QuillError";

/// User-facing notification surface.
pub trait NotificationSurface: Send + Sync {
    fn is_supported(&self) -> bool;
    fn show(&self, title: &str, body: &str);
}

/// Surface that reports through the log. Counts as supported, so failures
/// produce an empty replacement plus a log line rather than typed-out
/// diagnostics.
pub struct LogNotifier;

impl NotificationSurface for LogNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn show(&self, title: &str, body: &str) {
        warn!(title, body, "notification");
    }
}

/// Surface for environments with no notification channel at all.
pub struct NullNotifier;

impl NotificationSurface for NullNotifier {
    fn is_supported(&self) -> bool {
        false
    }

    fn show(&self, _title: &str, _body: &str) {}
}

//! User-facing notifications
//!
//! The controller reports outcomes a presentation layer should show (failed
//! saves, rejected edits) through a [`Notifier`]. Rendering them is up to
//! the caller.

use std::fmt;
use std::sync::Mutex;
use std::sync::PoisonError;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Receives user-facing messages from the controller.
pub trait Notifier: Send + Sync {
    /// Shows `message` with the given severity.
    fn notify(&self, message: &str, severity: Severity);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => log::info!("[notify] {}", message),
            Severity::Warning => log::warn!("[notify] {}", message),
            Severity::Error => log::error!("[notify] {}", message),
        }
    }
}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Keeps notifications in memory until they are drained.
///
/// Suits presentation layers that poll for toasts, and tests.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the pending notifications.
    pub fn messages(&self) -> Vec<Notification> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the pending notifications.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                message: message.to_string(),
                severity,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_drain() {
        let notifier = CollectingNotifier::new();
        notifier.notify("saved", Severity::Success);
        notifier.notify("nope", Severity::Warning);

        assert_eq!(notifier.messages().len(), 2);
        let drained = notifier.drain();
        assert_eq!(drained[1].severity, Severity::Warning);
        assert!(notifier.messages().is_empty());
    }
}

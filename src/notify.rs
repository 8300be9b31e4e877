//! Notification sink for transient, fire-and-forget user messages.
//!
//! The converter raises a [`Notification`] on every validation failure and on
//! every terminal success or failure. Inject an [`Arc<dyn Notifier>`] to route
//! them to a toast, a terminal line or a test recorder. Notifications carry no
//! retry semantics and never influence the workflow state.
//!
//! # Example
//!
//! ```rust
//! use web2md_client::{Notification, Notifier};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<Notification>>);
//!
//! impl Notifier for Recorder {
//!     fn notify(&self, notification: Notification) {
//!         self.0.lock().unwrap().push(notification);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    /// Validation errors and failed conversions.
    Destructive,
}

/// A short title plus a one-line description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Info)
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Destructive)
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

/// Receives notifications. Must not block; the converter calls it inline.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Discards every notification. This is the default sink.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Writes notifications to the `tracing` log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Info => info!(title = %n.title, "{}", n.description),
            Severity::Destructive => warn!(title = %n.title, "{}", n.description),
        }
    }
}

/// Convenience alias for the shared sink handle.
pub type SharedNotifier = Arc<dyn Notifier>;

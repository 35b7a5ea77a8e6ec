// Transient user-facing notifications

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::constants::NOTIFICATION_DISMISS_SECS;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A short on-screen message that dismisses itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    pub dismiss_after: Duration,
}

impl Notification {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Notification {
            text: text.into(),
            severity,
            dismiss_after: Duration::from_secs(NOTIFICATION_DISMISS_SECS),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Error)
    }
}

/// Trait for notification sinks
pub trait Notifier: Send {
    fn notify(&mut self, notification: Notification);
}

/// Writes notifications to the log at a level matching their severity.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    board: NotificationBoard,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notification still on screen at `now`, if any
    pub fn visible(&self, now: Instant) -> Option<&Notification> {
        self.board.visible(now)
    }
}

impl Notifier for TracingNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Success => info!("[notice] {}", notification.text),
            Severity::Warning => warn!("[notice] {}", notification.text),
            Severity::Error => error!("[notice] {}", notification.text),
        }
        self.board.show(notification, Instant::now());
    }
}

/// Forwards notifications over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&mut self, notification: Notification) {
        // Receiver gone means nobody is watching; nothing to do
        let _ = self.tx.send(notification);
    }
}

/// Holds the one notification currently on screen.
///
/// Showing a new notification replaces the previous one; each expires after
/// its own `dismiss_after`.
#[derive(Debug, Default)]
pub struct NotificationBoard {
    current: Option<(Notification, Instant)>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notification: Notification, now: Instant) {
        self.current = Some((notification, now));
    }

    pub fn visible(&self, now: Instant) -> Option<&Notification> {
        match &self.current {
            Some((n, shown_at)) if now.saturating_duration_since(*shown_at) < n.dismiss_after => {
                Some(n)
            }
            _ => None,
        }
    }
}

//! User-facing notifications (the toast channel).

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

pub type Notifications = mpsc::UnboundedReceiver<Notification>;

/// Sending half of the notification channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, Notifications) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notify");
        self.send(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "notify");
        self.send(Level::Error, message);
    }

    /// One error notification for a failed call. The text is fixed except
    /// for form validation, which reports the offending fields.
    pub fn notify_error(&self, err: &ClientError) {
        error!(error = %err, kind = ?err.kind(), "request failed");
        self.send(Level::Error, err.notification_message());
    }

    fn send(&self, level: Level, message: String) {
        if self.tx.send(Notification { level, message }).is_err() {
            debug!("notification receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::REQUEST_FAILED_MESSAGE;

    #[test]
    fn errors_use_the_fixed_message() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.notify_error(&ClientError::api(500, "stack trace"));
        notifier.notify_error(&ClientError::Transport("connection refused".into()));
        notifier.success("Saved");

        for _ in 0..2 {
            let n = rx.try_recv().unwrap();
            assert_eq!(n.level, Level::Error);
            assert_eq!(n.message, REQUEST_FAILED_MESSAGE);
        }
        assert_eq!(rx.try_recv().unwrap().level, Level::Success);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.success("nobody listening");
    }
}

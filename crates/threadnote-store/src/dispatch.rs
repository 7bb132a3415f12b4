//! Dispatcher that records notifications in the log instead of sending mail.

use threadnote_core::{Dispatcher, NotificationMessage, NotificationSet, Result};
use tracing::info;

/// Logs each notification at `info` level, one event per recipient.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    fn dispatch(&self, message: &NotificationMessage, recipients: &NotificationSet) -> Result<()> {
        for email in recipients.iter() {
            info!(
                to = email,
                thread_id = %message.thread_id,
                subject = %message.subject,
                "Notification queued"
            );
        }
        Ok(())
    }
}

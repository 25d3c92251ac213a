//! Console notification sender for development. Logs messages to tracing output.

use async_trait::async_trait;
use spacewarden_application::NotificationSender;
use spacewarden_core::AppResult;
use tracing::info;

/// Development notification sender that logs messages to the console.
#[derive(Clone)]
pub struct ConsoleNotificationSender;

impl ConsoleNotificationSender {
    /// Creates a new console notification sender.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSender for ConsoleNotificationSender {
    async fn send_notification(
        &self,
        sender: &str,
        subject: &str,
        html_body: &str,
        recipients: &[String],
    ) -> AppResult<()> {
        if recipients.is_empty() {
            return Ok(());
        }

        let to = recipients.join(", ");
        info!(
            from = sender,
            to = to.as_str(),
            subject = subject,
            "--- EMAIL (console) ---\nFrom: {}\nTo: {}\nSubject: {}\n\n{}\n--- END EMAIL ---",
            sender,
            to,
            subject,
            html_body
        );

        Ok(())
    }
}

use async_trait::async_trait;
use serde_json::Value;
use spacewarden_core::AppResult;

/// Port for delivering HTML notifications. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends one HTML message to every recipient.
    ///
    /// Succeeds without contacting the transport when `recipients` is empty.
    async fn send_notification(
        &self,
        sender: &str,
        subject: &str,
        html_body: &str,
        recipients: &[String],
    ) -> AppResult<()>;
}

/// Port for rendering named notification templates.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `template_name` with `data`, which must be a JSON object.
    fn render(&self, template_name: &str, data: &Value) -> AppResult<String>;
}

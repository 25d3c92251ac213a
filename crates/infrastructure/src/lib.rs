//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod cloud_controller_client;
mod console_notification_sender;
mod handlebars_template_renderer;
mod smtp_notification_sender;

pub use cloud_controller_client::CloudControllerClient;
pub use console_notification_sender::ConsoleNotificationSender;
pub use handlebars_template_renderer::HandlebarsTemplateRenderer;
pub use smtp_notification_sender::{SmtpNotificationConfig, SmtpNotificationSender};

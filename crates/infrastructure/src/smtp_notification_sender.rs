//! SMTP notification sender using the `lettre` crate.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Certificate, Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use spacewarden_application::NotificationSender;
use spacewarden_core::{AppError, AppResult};
use tracing::{info, warn};

const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP notification sender configuration.
#[derive(Clone)]
pub struct SmtpNotificationConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// PEM-encoded CA certificate trusted in addition to the system roots.
    pub ca_certificate: Option<String>,
}

/// Production notification sender using SMTP.
#[derive(Clone)]
pub struct SmtpNotificationSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// Creates a new SMTP notification sender.
    ///
    /// Port 465 uses implicit TLS, any other port requires STARTTLS.
    pub fn new(config: SmtpNotificationConfig) -> AppResult<Self> {
        let mut tls = TlsParameters::builder(config.host.clone());
        if let Some(pem) = config.ca_certificate.as_deref() {
            let certificate = Certificate::from_pem(pem.as_bytes()).map_err(|error| {
                AppError::Validation(format!("invalid SMTP CA certificate: {error}"))
            })?;
            tls = tls.add_root_certificate(certificate);
        }
        let tls = tls.build().map_err(|error| {
            AppError::Internal(format!("failed to build SMTP TLS parameters: {error}"))
        })?;

        let tls = if config.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls)
        } else {
            Tls::Required(tls)
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { mailer })
    }
}

/// Builds an HTML message addressed to every recipient lettre accepts.
///
/// Unparseable recipients are skipped; the message fails only when none remain.
pub(crate) fn build_message(
    sender: &str,
    subject: &str,
    html_body: &str,
    recipients: &[String],
) -> AppResult<Message> {
    let from: Mailbox = sender
        .parse()
        .map_err(|error| AppError::Notification(format!("invalid sender address: {error}")))?;

    let mut builder = Message::builder().from(from).subject(subject);
    let mut accepted = 0_usize;
    for recipient in recipients {
        match recipient.parse::<Mailbox>() {
            Ok(mailbox) => {
                builder = builder.to(mailbox);
                accepted += 1;
            }
            Err(error) => {
                warn!(recipient = recipient.as_str(), error = %error, "skipping recipient");
            }
        }
    }
    if accepted == 0 {
        return Err(AppError::Notification(
            "no valid recipient addresses".to_owned(),
        ));
    }

    builder
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_owned())
        .map_err(|error| AppError::Notification(format!("failed to build email: {error}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
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

        let message = build_message(sender, subject, html_body, recipients)?;

        self.mailer
            .send(message)
            .await
            .map_err(|error| AppError::Notification(format!("failed to send email: {error}")))?;

        info!(
            subject = subject,
            recipients = recipients.len(),
            "notification delivered"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use spacewarden_application::NotificationSender;
    use spacewarden_core::AppError;

    use super::{SmtpNotificationConfig, SmtpNotificationSender, build_message};

    fn config() -> SmtpNotificationConfig {
        SmtpNotificationConfig {
            host: "smtp.example.gov".to_owned(),
            port: 587,
            username: "mailer".to_owned(),
            password: "secret".to_owned(),
            ca_certificate: None,
        }
    }

    #[test]
    fn message_lists_every_recipient() {
        let message = build_message(
            "sandbox@example.gov",
            "Space expiring",
            "<p>hello</p>",
            &["one@example.gov".to_owned(), "two@example.gov".to_owned()],
        )
        .unwrap_or_else(|_| panic!("test"));

        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("one@example.gov"));
        assert!(formatted.contains("two@example.gov"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn unparseable_recipient_does_not_block_the_others() {
        let message = build_message(
            "sandbox@example.gov",
            "Space expiring",
            "<p>hello</p>",
            &["a,b@agency.gov".to_owned(), "good@agency.gov".to_owned()],
        )
        .unwrap_or_else(|_| panic!("test"));

        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("good@agency.gov"));
        assert!(!formatted.contains("a,b@agency.gov"));
    }

    #[test]
    fn invalid_recipient_is_a_notification_error() {
        let result = build_message("sandbox@example.gov", "s", "b", &["nope".to_owned()]);
        assert!(matches!(result, Err(AppError::Notification(_))));
    }

    #[tokio::test]
    async fn empty_recipient_list_is_a_no_op() {
        let sender =
            SmtpNotificationSender::new(config()).unwrap_or_else(|_| panic!("test"));

        let result = sender
            .send_notification("sandbox@example.gov", "subject", "<p></p>", &[])
            .await;

        assert!(result.is_ok());
    }
}

//! Spacewarden sandbox lifecycle worker.

#![forbid(unsafe_code)]

mod worker_config;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spacewarden_application::{
    NotificationSender, SandboxLifecycleConfig, SandboxLifecycleService, TemplateRenderer,
};
use spacewarden_core::{AppError, AppResult};
use spacewarden_infrastructure::{
    CloudControllerClient, ConsoleNotificationSender, HandlebarsTemplateRenderer,
    SmtpNotificationConfig, SmtpNotificationSender,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::worker_config::{EmailProviderConfig, WorkerConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let service = build_lifecycle_service(&config)?;

    info!(
        api_url = %config.api_url,
        org_prefix = config.organization_prefix.as_str(),
        notify_threshold_days = config.policy.notify_threshold_days(),
        purge_threshold_days = config.policy.purge_threshold_days(),
        time_starts_at = %config.policy.time_starts_at(),
        dry_run = config.dry_run,
        "spacewarden-worker started"
    );

    let Some(interval_seconds) = config.run_interval_seconds else {
        service.run(Utc::now()).await?;
        return Ok(());
    };

    loop {
        if let Err(error) = service.run(Utc::now()).await {
            warn!(error = %error, "sandbox sweep failed");
        }
        tokio::time::sleep(Duration::from_secs(interval_seconds)).await;
    }
}

fn build_lifecycle_service(config: &WorkerConfig) -> AppResult<SandboxLifecycleService> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let platform = Arc::new(CloudControllerClient::new(
        http_client,
        config.api_url.as_str(),
        config.api_token.as_str(),
    )?);

    let notifier: Arc<dyn NotificationSender> = match &config.email_provider {
        EmailProviderConfig::Console => Arc::new(ConsoleNotificationSender::new()),
        EmailProviderConfig::Smtp(smtp) => {
            Arc::new(SmtpNotificationSender::new(SmtpNotificationConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                ca_certificate: smtp.ca_certificate.clone(),
            })?)
        }
    };

    let templates: Arc<dyn TemplateRenderer> = match &config.template_dir {
        Some(directory) => Arc::new(HandlebarsTemplateRenderer::from_directory(directory)?),
        None => Arc::new(HandlebarsTemplateRenderer::new()?),
    };

    Ok(SandboxLifecycleService::new(
        platform,
        notifier,
        templates,
        SandboxLifecycleConfig {
            organization_prefix: config.organization_prefix.clone(),
            policy: config.policy.clone(),
            mail_sender: config.mail_sender.clone(),
            dry_run: config.dry_run,
        },
    ))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

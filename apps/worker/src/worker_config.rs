use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use spacewarden_core::{AppError, AppResult, NonEmptyString};
use spacewarden_domain::{EmailAddress, LifecyclePolicy};

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub ca_certificate: Option<String>,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub api_url: String,
    pub api_token: String,
    pub organization_prefix: NonEmptyString,
    pub policy: LifecyclePolicy,
    pub mail_sender: String,
    pub template_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub run_interval_seconds: Option<u64>,
    pub email_provider: EmailProviderConfig,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(raw_lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let lookup = |name: &str| {
            raw_lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        // Secrets are taken verbatim.
        let required_secret = |name: &str| {
            raw_lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let api_url = required("SPACEWARDEN_API_URL")?
            .trim_end_matches('/')
            .to_owned();
        let api_token = required_secret("SPACEWARDEN_API_TOKEN")?;
        let organization_prefix = NonEmptyString::new(required("SPACEWARDEN_ORG_PREFIX")?)?;

        let notify_threshold = parse_u32(
            "SPACEWARDEN_NOTIFY_THRESHOLD_DAYS",
            required("SPACEWARDEN_NOTIFY_THRESHOLD_DAYS")?,
        )?;
        let purge_threshold = parse_u32(
            "SPACEWARDEN_PURGE_THRESHOLD_DAYS",
            required("SPACEWARDEN_PURGE_THRESHOLD_DAYS")?,
        )?;
        let time_starts_at_raw = required("SPACEWARDEN_TIME_STARTS_AT")?;
        let time_starts_at = DateTime::parse_from_rfc3339(time_starts_at_raw.as_str())
            .map(|value| value.with_timezone(&Utc))
            .map_err(|error| {
                AppError::Validation(format!(
                    "invalid SPACEWARDEN_TIME_STARTS_AT value '{time_starts_at_raw}': {error}"
                ))
            })?;
        let policy = LifecyclePolicy::new(notify_threshold, purge_threshold, time_starts_at)?;

        let mail_sender: String = EmailAddress::new(required("SPACEWARDEN_MAIL_SENDER")?)
            .map_err(|error| {
                AppError::Validation(format!("invalid SPACEWARDEN_MAIL_SENDER: {error}"))
            })?
            .into();

        let template_dir = lookup("SPACEWARDEN_TEMPLATE_DIR").map(PathBuf::from);
        let dry_run = lookup("SPACEWARDEN_DRY_RUN")
            .map(|value| parse_bool("SPACEWARDEN_DRY_RUN", value))
            .transpose()?
            .unwrap_or(false);

        let run_interval_seconds = lookup("SPACEWARDEN_RUN_INTERVAL_SECONDS")
            .map(|value| parse_u64("SPACEWARDEN_RUN_INTERVAL_SECONDS", value))
            .transpose()?;
        if run_interval_seconds == Some(0) {
            return Err(AppError::Validation(
                "SPACEWARDEN_RUN_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let email_provider = match lookup("EMAIL_PROVIDER")
            .unwrap_or_else(|| "smtp".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                host: required("SMTP_HOST")?,
                port: lookup("SMTP_PORT")
                    .map(|value| parse_u16("SMTP_PORT", value))
                    .transpose()?
                    .unwrap_or(587),
                username: required("SMTP_USER")?,
                password: required_secret("SMTP_PASS")?,
                ca_certificate: lookup("SMTP_CERT"),
            }),
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be 'smtp' or 'console', got '{other}'"
                )));
            }
        };

        Ok(Self {
            api_url,
            api_token,
            organization_prefix,
            policy,
            mail_sender,
            template_dir,
            dry_run,
            run_interval_seconds,
            email_provider,
        })
    }
}

fn parse_bool(name: &str, value: String) -> AppResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid {name} value '{value}': expected true or false"
        ))),
    }
}

fn parse_u16(name: &str, value: String) -> AppResult<u16> {
    value.parse::<u16>().map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })
}

fn parse_u32(name: &str, value: String) -> AppResult<u32> {
    value.parse::<u32>().map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })
}

fn parse_u64(name: &str, value: String) -> AppResult<u64> {
    value.parse::<u64>().map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })
}

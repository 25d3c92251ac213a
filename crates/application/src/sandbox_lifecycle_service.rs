//! Periodic sandbox sweep: classify every space of every sandbox organization,
//! warn members of ageing spaces and purge expired ones.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use spacewarden_core::{AppError, AppResult, NonEmptyString};
use spacewarden_domain::{
    ClassificationReport, Guid, LifecyclePolicy, Organization, SpaceClassification,
    SpaceRecipients, age_in_days, classify_spaces,
};
use tracing::{info, warn};

use crate::lifecycle_ports::{NotificationSender, PlatformClient, TemplateRenderer};
use crate::purge_service::PurgeService;

/// Template used to warn members of a space that is about to be purged.
pub const NOTIFY_TEMPLATE: &str = "notify";
/// Template used to tell members that their space was purged.
pub const PURGE_TEMPLATE: &str = "purge";

/// Settings for one sweep.
#[derive(Debug, Clone)]
pub struct SandboxLifecycleConfig {
    /// Only organizations whose name starts with this prefix are swept.
    pub organization_prefix: NonEmptyString,
    /// Aging policy.
    pub policy: LifecyclePolicy,
    /// From address of notification emails.
    pub mail_sender: String,
    /// Classify and log without deleting or mailing.
    pub dry_run: bool,
}

/// Outcome of sweeping one organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizationOutcome {
    /// Spaces whose members were warned.
    pub notified: usize,
    /// Spaces that were purged.
    pub purged: usize,
    /// Purge or notification attempts that failed.
    pub failed_actions: usize,
    /// Mails skipped because no member had a deliverable address.
    pub unreachable: usize,
}

/// Totals of a full sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleRunSummary {
    /// Sandbox organizations visited.
    pub organizations: usize,
    /// Organizations skipped because listing or classification failed.
    pub failed_organizations: usize,
    /// Spaces whose members were warned.
    pub notified: usize,
    /// Spaces that were purged.
    pub purged: usize,
    /// Purge or notification attempts that failed.
    pub failed_actions: usize,
    /// Mails skipped because no member had a deliverable address.
    pub unreachable: usize,
}

impl LifecycleRunSummary {
    fn record(&mut self, outcome: OrganizationOutcome) {
        self.notified += outcome.notified;
        self.purged += outcome.purged;
        self.failed_actions += outcome.failed_actions;
        self.unreachable += outcome.unreachable;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Unreachable,
}

/// Application service driving the sandbox lifecycle.
#[derive(Clone)]
pub struct SandboxLifecycleService {
    platform: Arc<dyn PlatformClient>,
    purge_service: PurgeService,
    notifier: Arc<dyn NotificationSender>,
    templates: Arc<dyn TemplateRenderer>,
    config: SandboxLifecycleConfig,
}

impl SandboxLifecycleService {
    /// Creates a new sandbox lifecycle service.
    #[must_use]
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        notifier: Arc<dyn NotificationSender>,
        templates: Arc<dyn TemplateRenderer>,
        config: SandboxLifecycleConfig,
    ) -> Self {
        Self {
            purge_service: PurgeService::new(platform.clone()),
            platform,
            notifier,
            templates,
            config,
        }
    }

    /// Lists organizations whose name starts with the configured prefix.
    pub async fn list_sandbox_organizations(&self) -> AppResult<Vec<Organization>> {
        let organizations = self.platform.list_organizations().await?;

        Ok(organizations
            .into_iter()
            .filter(|organization| {
                organization
                    .name
                    .starts_with(self.config.organization_prefix.as_str())
            })
            .collect())
    }

    /// Fetches a fresh snapshot of an organization and classifies its spaces.
    pub async fn classify_organization(
        &self,
        organization: &Organization,
        now: DateTime<Utc>,
    ) -> AppResult<ClassificationReport> {
        let resources = self
            .platform
            .list_organization_resources(organization)
            .await?;

        classify_spaces(
            &resources.spaces,
            &resources.applications,
            &resources.instances,
            now,
            &self.config.policy,
        )
    }

    /// Sweeps every sandbox organization.
    ///
    /// Failing to list organizations fails the sweep. A failure inside one
    /// organization skips that organization only.
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<LifecycleRunSummary> {
        let organizations = self.list_sandbox_organizations().await?;
        let mut summary = LifecycleRunSummary {
            organizations: organizations.len(),
            ..LifecycleRunSummary::default()
        };

        for organization in &organizations {
            match self.process_organization(organization, now).await {
                Ok(outcome) => summary.record(outcome),
                Err(error) => {
                    summary.failed_organizations += 1;
                    warn!(
                        org = %organization.name,
                        error = %error,
                        "skipping organization"
                    );
                }
            }
        }

        info!(
            organizations = summary.organizations,
            failed_organizations = summary.failed_organizations,
            notified = summary.notified,
            purged = summary.purged,
            failed_actions = summary.failed_actions,
            unreachable = summary.unreachable,
            dry_run = self.config.dry_run,
            "sandbox sweep finished"
        );

        Ok(summary)
    }

    /// Classifies one organization, then notifies and purges its spaces.
    ///
    /// Nothing is acted upon unless the whole organization classified cleanly.
    pub async fn process_organization(
        &self,
        organization: &Organization,
        now: DateTime<Utc>,
    ) -> AppResult<OrganizationOutcome> {
        let report = self.classify_organization(organization, now).await?;
        info!(
            org = %organization.name,
            to_notify = report.to_notify.len(),
            to_purge = report.to_purge.len(),
            "organization classified"
        );

        let mut outcome = OrganizationOutcome::default();
        if report.is_empty() {
            return Ok(outcome);
        }

        if self.config.dry_run {
            for entry in &report.to_notify {
                info!(
                    org = %organization.name,
                    space = %entry.space.name,
                    anchor = %entry.anchor,
                    "dry run: would notify"
                );
            }
            for entry in &report.to_purge {
                info!(
                    org = %organization.name,
                    space = %entry.space.name,
                    anchor = %entry.anchor,
                    "dry run: would purge"
                );
            }
            return Ok(outcome);
        }

        let eligible_users: HashSet<Guid> = self
            .platform
            .list_organization_users(organization)
            .await?
            .into_iter()
            .collect();

        for entry in &report.to_notify {
            match self
                .notify_space(organization, entry, &eligible_users, now)
                .await
            {
                Ok(Delivery::Sent) => outcome.notified += 1,
                Ok(Delivery::Unreachable) => outcome.unreachable += 1,
                Err(error) => {
                    outcome.failed_actions += 1;
                    warn!(
                        org = %organization.name,
                        space = %entry.space.name,
                        error = %error,
                        "failed to notify space members"
                    );
                }
            }
        }

        for entry in &report.to_purge {
            // Roles disappear with the space.
            let recipients = match self.recipients(entry, &eligible_users).await {
                Ok(recipients) => Some(recipients),
                Err(error) => {
                    outcome.failed_actions += 1;
                    warn!(
                        org = %organization.name,
                        space = %entry.space.name,
                        error = %error,
                        "failed to resolve space members"
                    );
                    None
                }
            };

            if let Err(error) = self.purge_service.purge_space(&entry.space).await {
                outcome.failed_actions += 1;
                warn!(
                    org = %organization.name,
                    space = %entry.space.name,
                    error = %error,
                    "failed to purge space"
                );
                continue;
            }
            outcome.purged += 1;

            let Some(recipients) = recipients else {
                continue;
            };
            let subject = format!(
                "Your sandbox space {}/{} has been deleted",
                organization.name, entry.space.name
            );
            match self
                .send(PURGE_TEMPLATE, subject.as_str(), organization, entry, &recipients, now)
                .await
            {
                Ok(Delivery::Sent) => {}
                Ok(Delivery::Unreachable) => outcome.unreachable += 1,
                Err(error) => {
                    outcome.failed_actions += 1;
                    warn!(
                        org = %organization.name,
                        space = %entry.space.name,
                        error = %error,
                        "failed to notify members of purged space"
                    );
                }
            }
        }

        Ok(outcome)
    }

    async fn notify_space(
        &self,
        organization: &Organization,
        entry: &SpaceClassification,
        eligible_users: &HashSet<Guid>,
        now: DateTime<Utc>,
    ) -> AppResult<Delivery> {
        let recipients = self.recipients(entry, eligible_users).await?;
        let subject = format!(
            "Your sandbox space {}/{} will be deleted soon",
            organization.name, entry.space.name
        );

        self.send(NOTIFY_TEMPLATE, subject.as_str(), organization, entry, &recipients, now)
            .await
    }

    async fn recipients(
        &self,
        entry: &SpaceClassification,
        eligible_users: &HashSet<Guid>,
    ) -> AppResult<SpaceRecipients> {
        let roles = self.platform.list_space_roles(&entry.space).await?;
        Ok(SpaceRecipients::from_roles(eligible_users, &roles))
    }

    async fn send(
        &self,
        template_name: &str,
        subject: &str,
        organization: &Organization,
        entry: &SpaceClassification,
        recipients: &SpaceRecipients,
        now: DateTime<Utc>,
    ) -> AppResult<Delivery> {
        if recipients.is_unreachable() {
            warn!(
                org = %organization.name,
                space = %entry.space.name,
                template = template_name,
                "no deliverable addresses for space"
            );
            return Ok(Delivery::Unreachable);
        }

        let policy = &self.config.policy;
        let purge_date = policy.purge_due_at(entry.anchor).ok_or_else(|| {
            AppError::Internal(format!(
                "purge date of space '{}' is out of range",
                entry.space.guid
            ))
        })?;
        let days_remaining =
            i64::from(policy.purge_threshold_days()) - age_in_days(entry.anchor, now);

        let body = self.templates.render(
            template_name,
            &json!({
                "org": organization.name,
                "space": entry.space.name,
                "anchor_date": entry.anchor.format("%Y-%m-%d").to_string(),
                "purge_date": purge_date.format("%Y-%m-%d").to_string(),
                "notify_threshold": policy.notify_threshold_days(),
                "purge_threshold": policy.purge_threshold_days(),
                "days_remaining": days_remaining.max(0),
            }),
        )?;

        self.notifier
            .send_notification(
                self.config.mail_sender.as_str(),
                subject,
                body.as_str(),
                &recipients.addresses,
            )
            .await?;

        info!(
            org = %organization.name,
            space = %entry.space.name,
            template = template_name,
            recipients = recipients.addresses.len(),
            "notification sent"
        );

        Ok(Delivery::Sent)
    }
}

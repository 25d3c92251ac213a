use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use spacewarden_core::{AppError, AppResult};
use spacewarden_domain::{Application, Guid, Organization, ServiceInstance, Space, SpaceRole};

use crate::lifecycle_ports::{
    NotificationSender, OrganizationResources, PlatformClient, TemplateRenderer,
};

pub(crate) fn organization(guid: &str, name: &str) -> Organization {
    Organization {
        guid: Guid::from(guid),
        name: name.to_owned(),
    }
}

pub(crate) fn space(guid: &str, organization_guid: &str) -> Space {
    Space {
        guid: Guid::from(guid),
        name: format!("{guid}-name"),
        organization_guid: Guid::from(organization_guid),
    }
}

pub(crate) fn application(guid: &str, space_guid: &str, created_at: &str) -> Application {
    Application {
        guid: Guid::from(guid),
        name: format!("{guid}-name"),
        space_guid: Guid::from(space_guid),
        created_at: created_at.to_owned(),
    }
}

pub(crate) fn instance(guid: &str, space_guid: &str, created_at: &str) -> ServiceInstance {
    ServiceInstance {
        guid: Guid::from(guid),
        name: format!("{guid}-name"),
        space_guid: Guid::from(space_guid),
        created_at: created_at.to_owned(),
    }
}

/// Records every mutating call and fails on demand.
#[derive(Default)]
pub(crate) struct FakePlatform {
    pub organizations: Vec<Organization>,
    pub resources: HashMap<Guid, OrganizationResources>,
    pub users: HashMap<Guid, Vec<Guid>>,
    pub roles: HashMap<Guid, Vec<SpaceRole>>,
    pub space_applications: HashMap<Guid, Vec<Application>>,
    pub failing_space_deletes: HashSet<Guid>,
    pub failing_application_deletes: HashSet<Guid>,
    pub fail_application_listing: bool,
    pub failing_role_lookups: HashSet<Guid>,
    pub space_deletes: Mutex<Vec<Guid>>,
    pub application_deletes: Mutex<Vec<Guid>>,
    pub application_listings: Mutex<Vec<Guid>>,
    pub role_lookups: Mutex<Vec<Guid>>,
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        Ok(self.organizations.clone())
    }

    async fn list_organization_resources(
        &self,
        organization: &Organization,
    ) -> AppResult<OrganizationResources> {
        self.resources
            .get(&organization.guid)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("no resources for {}", organization.guid)))
    }

    async fn list_organization_users(&self, organization: &Organization) -> AppResult<Vec<Guid>> {
        Ok(self
            .users
            .get(&organization.guid)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_space_roles(&self, space: &Space) -> AppResult<Vec<SpaceRole>> {
        self.role_lookups.lock().await.push(space.guid.clone());
        if self.failing_role_lookups.contains(&space.guid) {
            return Err(AppError::Upstream(format!("roles of {} unavailable", space.guid)));
        }
        Ok(self.roles.get(&space.guid).cloned().unwrap_or_default())
    }

    async fn delete_space(&self, space_guid: &Guid, recursive: bool) -> AppResult<()> {
        if !recursive {
            return Err(AppError::Internal(
                "spaces must be deleted recursively".to_owned(),
            ));
        }

        self.space_deletes.lock().await.push(space_guid.clone());
        if self.failing_space_deletes.contains(space_guid) {
            return Err(AppError::Delete(format!("space {space_guid} is locked")));
        }

        Ok(())
    }

    async fn delete_application(&self, application_guid: &Guid) -> AppResult<()> {
        self.application_deletes
            .lock()
            .await
            .push(application_guid.clone());
        if self.failing_application_deletes.contains(application_guid) {
            return Err(AppError::Delete(format!(
                "application {application_guid} is locked"
            )));
        }

        Ok(())
    }

    async fn list_applications_by_space(&self, space_guid: &Guid) -> AppResult<Vec<Application>> {
        self.application_listings
            .lock()
            .await
            .push(space_guid.clone());
        if self.fail_application_listing {
            return Err(AppError::Upstream("application listing unavailable".to_owned()));
        }

        Ok(self
            .space_applications
            .get(space_guid)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SentNotification {
    pub sender: String,
    pub subject: String,
    pub html_body: String,
    pub recipients: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeNotificationSender {
    pub sent: Mutex<Vec<SentNotification>>,
}

#[async_trait]
impl NotificationSender for FakeNotificationSender {
    async fn send_notification(
        &self,
        sender: &str,
        subject: &str,
        html_body: &str,
        recipients: &[String],
    ) -> AppResult<()> {
        self.sent.lock().await.push(SentNotification {
            sender: sender.to_owned(),
            subject: subject.to_owned(),
            html_body: html_body.to_owned(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}

/// Renders `<template>|<space>|<purge_date>` so tests can inspect the data.
pub(crate) struct FakeTemplateRenderer;

impl TemplateRenderer for FakeTemplateRenderer {
    fn render(&self, template_name: &str, data: &Value) -> AppResult<String> {
        let space = data.get("space").and_then(Value::as_str).unwrap_or("");
        let purge_date = data.get("purge_date").and_then(Value::as_str).unwrap_or("");
        Ok(format!("{template_name}|{space}|{purge_date}"))
    }
}

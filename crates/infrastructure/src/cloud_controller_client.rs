//! Cloud controller (v2 API) adapter for the platform port.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use spacewarden_application::{OrganizationResources, PlatformClient};
use spacewarden_core::{AppError, AppResult};
use spacewarden_domain::{
    Application, Guid, Organization, ServiceInstance, Space, SpaceRole, SpaceRoleKind,
};
use tracing::debug;
use url::Url;

/// HTTP client for the platform's cloud controller.
///
/// Follows `next_url` pagination and never retries; every call yields a
/// terminal result.
#[derive(Clone)]
pub struct CloudControllerClient {
    http_client: reqwest::Client,
    api_url: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Page<E> {
    next_url: Option<String>,
    resources: Vec<Resource<E>>,
}

#[derive(Debug, Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpaceEntity {
    name: String,
    organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct SpaceScopedEntity {
    name: String,
    space_guid: String,
}

#[derive(Debug, Deserialize)]
struct UserRolesEntity {
    username: Option<String>,
    #[serde(default)]
    space_roles: Vec<SpaceRoleKind>,
}

impl CloudControllerClient {
    /// Creates a client for the API rooted at `api_url`.
    ///
    /// The URL must be a bare host root; `/v2` paths are resolved against it.
    pub fn new(
        http_client: reqwest::Client,
        api_url: &str,
        access_token: impl Into<String>,
    ) -> AppResult<Self> {
        let api_url = Url::parse(api_url).map_err(|error| {
            AppError::Validation(format!("invalid platform API URL '{api_url}': {error}"))
        })?;
        if api_url.path() != "/" {
            return Err(AppError::Validation(format!(
                "platform API URL '{api_url}' must not carry a path"
            )));
        }

        Ok(Self {
            http_client,
            api_url,
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, path: &str, query: Option<&str>) -> AppResult<Url> {
        let mut url = self.api_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build platform URL for '{path}': {error}"))
        })?;
        if let Some(query) = query {
            url.query_pairs_mut().append_pair("q", query);
        }

        Ok(url)
    }

    async fn list_all<E: DeserializeOwned>(&self, first: Url) -> AppResult<Vec<Resource<E>>> {
        let mut resources = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next {
            let page: Page<E> = self.get_json(url).await?;
            resources.extend(page.resources);
            next = page
                .next_url
                .map(|next_url| self.endpoint(next_url.as_str(), None))
                .transpose()?;
        }

        Ok(resources)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        debug!(url = %url, "listing platform resources");
        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(self.access_token.as_str())
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("failed to call {url}: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Upstream(format!(
                "{url} returned status {}: {body}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Upstream(format!("failed to parse response body of {url}: {error}"))
        })
    }

    async fn delete(&self, url: Url) -> AppResult<()> {
        let response = self
            .http_client
            .delete(url.clone())
            .bearer_auth(self.access_token.as_str())
            .send()
            .await
            .map_err(|error| AppError::Delete(format!("failed to call {url}: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        Err(AppError::Delete(format!(
            "{url} returned status {}: {body}",
            status.as_u16()
        )))
    }

    async fn list_applications(&self, query: &str) -> AppResult<Vec<Application>> {
        let url = self.endpoint("/v2/apps", Some(query))?;
        let resources = self.list_all::<SpaceScopedEntity>(url).await?;
        Ok(resources.into_iter().map(into_application).collect())
    }
}

fn into_organization(resource: Resource<OrganizationEntity>) -> Organization {
    Organization {
        guid: Guid::new(resource.metadata.guid),
        name: resource.entity.name,
    }
}

fn into_space(resource: Resource<SpaceEntity>) -> Space {
    Space {
        guid: Guid::new(resource.metadata.guid),
        name: resource.entity.name,
        organization_guid: Guid::new(resource.entity.organization_guid),
    }
}

// A missing creation time stays empty and is rejected during classification.
fn into_application(resource: Resource<SpaceScopedEntity>) -> Application {
    Application {
        guid: Guid::new(resource.metadata.guid),
        name: resource.entity.name,
        space_guid: Guid::new(resource.entity.space_guid),
        created_at: resource.metadata.created_at.unwrap_or_default(),
    }
}

fn into_service_instance(resource: Resource<SpaceScopedEntity>) -> ServiceInstance {
    ServiceInstance {
        guid: Guid::new(resource.metadata.guid),
        name: resource.entity.name,
        space_guid: Guid::new(resource.entity.space_guid),
        created_at: resource.metadata.created_at.unwrap_or_default(),
    }
}

fn into_space_role(resource: Resource<UserRolesEntity>) -> SpaceRole {
    SpaceRole {
        user_guid: Guid::new(resource.metadata.guid),
        username: resource.entity.username.unwrap_or_default(),
        roles: resource.entity.space_roles,
    }
}

#[async_trait]
impl PlatformClient for CloudControllerClient {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let url = self.endpoint("/v2/organizations", None)?;
        let resources = self.list_all::<OrganizationEntity>(url).await?;
        Ok(resources.into_iter().map(into_organization).collect())
    }

    async fn list_organization_resources(
        &self,
        organization: &Organization,
    ) -> AppResult<OrganizationResources> {
        let scope = format!("organization_guid:{}", organization.guid);

        let applications = self.list_applications(scope.as_str()).await?;

        let url = self.endpoint("/v2/service_instances", Some(scope.as_str()))?;
        let instances = self
            .list_all::<SpaceScopedEntity>(url)
            .await?
            .into_iter()
            .map(into_service_instance)
            .collect();

        let url = self.endpoint(
            format!("/v2/organizations/{}/spaces", organization.guid).as_str(),
            None,
        )?;
        let spaces = self
            .list_all::<SpaceEntity>(url)
            .await?
            .into_iter()
            .map(into_space)
            .collect();

        Ok(OrganizationResources {
            spaces,
            applications,
            instances,
        })
    }

    async fn list_organization_users(&self, organization: &Organization) -> AppResult<Vec<Guid>> {
        let url = self.endpoint(
            format!("/v2/organizations/{}/users", organization.guid).as_str(),
            None,
        )?;
        let resources = self.list_all::<IgnoredAny>(url).await?;
        Ok(resources
            .into_iter()
            .map(|resource| Guid::new(resource.metadata.guid))
            .collect())
    }

    async fn list_space_roles(&self, space: &Space) -> AppResult<Vec<SpaceRole>> {
        let url = self.endpoint(format!("/v2/spaces/{}/user_roles", space.guid).as_str(), None)?;
        let resources = self.list_all::<UserRolesEntity>(url).await?;
        Ok(resources.into_iter().map(into_space_role).collect())
    }

    async fn delete_space(&self, space_guid: &Guid, recursive: bool) -> AppResult<()> {
        let mut url = self.endpoint(format!("/v2/spaces/{space_guid}").as_str(), None)?;
        url.query_pairs_mut()
            .append_pair("recursive", if recursive { "true" } else { "false" })
            .append_pair("async", "false");
        self.delete(url).await
    }

    async fn delete_application(&self, application_guid: &Guid) -> AppResult<()> {
        let url = self.endpoint(format!("/v2/apps/{application_guid}").as_str(), None)?;
        self.delete(url).await
    }

    async fn list_applications_by_space(&self, space_guid: &Guid) -> AppResult<Vec<Application>> {
        self.list_applications(format!("space_guid:{space_guid}").as_str())
            .await
    }
}

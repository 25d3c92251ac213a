use async_trait::async_trait;
use spacewarden_core::AppResult;
use spacewarden_domain::{Application, Guid, Organization, ServiceInstance, Space, SpaceRole};

/// Snapshot of everything an organization contains.
#[derive(Debug, Clone, Default)]
pub struct OrganizationResources {
    /// Spaces of the organization.
    pub spaces: Vec<Space>,
    /// Applications across all spaces of the organization.
    pub applications: Vec<Application>,
    /// Service instances across all spaces of the organization.
    pub instances: Vec<ServiceInstance>,
}

/// Port for the multi-tenant platform API.
///
/// Every call returns a terminal result; retries belong to the adapter.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Lists every organization visible to the caller.
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// Lists spaces, applications and service instances of one organization.
    async fn list_organization_resources(
        &self,
        organization: &Organization,
    ) -> AppResult<OrganizationResources>;

    /// Lists identifiers of users belonging to an organization.
    async fn list_organization_users(&self, organization: &Organization) -> AppResult<Vec<Guid>>;

    /// Lists users and their roles within a space.
    async fn list_space_roles(&self, space: &Space) -> AppResult<Vec<SpaceRole>>;

    /// Deletes a space, including its contents when `recursive` is set.
    async fn delete_space(&self, space_guid: &Guid, recursive: bool) -> AppResult<()>;

    /// Deletes one application.
    async fn delete_application(&self, application_guid: &Guid) -> AppResult<()>;

    /// Lists applications scoped to one space.
    async fn list_applications_by_space(&self, space_guid: &Guid) -> AppResult<Vec<Application>>;
}

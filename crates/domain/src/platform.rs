//! Platform entities as observed through the cloud controller.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Wraps a platform identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Guid {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Tenant organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier.
    pub guid: Guid,
    /// Organization display name.
    pub name: String,
}

/// Tenant-isolated workspace inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Space identifier.
    pub guid: Guid,
    /// Space display name.
    pub name: String,
    /// Owning organization.
    pub organization_guid: Guid,
}

/// Deployed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier.
    pub guid: Guid,
    /// Application name.
    pub name: String,
    /// Owning space.
    pub space_guid: Guid,
    /// Raw creation time as reported by the platform.
    pub created_at: String,
}

/// Provisioned service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Service instance identifier.
    pub guid: Guid,
    /// Service instance name.
    pub name: String,
    /// Owning space.
    pub space_guid: Guid,
    /// Raw creation time as reported by the platform.
    pub created_at: String,
}

/// Resource category used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An application.
    Application,
    /// A service instance.
    ServiceInstance,
}

impl ResourceKind {
    /// Returns a stable label for logs and errors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::ServiceInstance => "service instance",
        }
    }
}

/// Anything that lives inside a space and carries a creation time.
pub trait SpaceResource {
    /// Resource identifier.
    fn guid(&self) -> &Guid;
    /// Identifier of the owning space.
    fn space_guid(&self) -> &Guid;
    /// Raw creation time.
    fn created_at(&self) -> &str;
    /// Resource category.
    fn kind(&self) -> ResourceKind;
}

impl SpaceResource for Application {
    fn guid(&self) -> &Guid {
        &self.guid
    }

    fn space_guid(&self) -> &Guid {
        &self.space_guid
    }

    fn created_at(&self) -> &str {
        self.created_at.as_str()
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Application
    }
}

impl SpaceResource for ServiceInstance {
    fn guid(&self) -> &Guid {
        &self.guid
    }

    fn space_guid(&self) -> &Guid {
        &self.space_guid
    }

    fn created_at(&self) -> &str {
        self.created_at.as_str()
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::ServiceInstance
    }
}

/// Role held by a user within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceRoleKind {
    /// May push and manage applications.
    SpaceDeveloper,
    /// May manage space membership.
    SpaceManager,
    /// Read-only access.
    SpaceAuditor,
    /// Any role this service does not act on.
    #[serde(other)]
    Other,
}

/// A user together with every role they hold in one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRole {
    /// User identifier.
    pub user_guid: Guid,
    /// Login name, usually an email address.
    pub username: String,
    /// Roles held in the space.
    pub roles: Vec<SpaceRoleKind>,
}

#[cfg(test)]
mod tests {
    use super::{Guid, SpaceRoleKind};

    #[test]
    fn unknown_space_role_deserializes_as_other() {
        let roles: Vec<SpaceRoleKind> =
            serde_json::from_str(r#"["space_manager", "org_billing_manager"]"#)
                .unwrap_or_else(|_| panic!("test"));

        assert_eq!(roles, vec![SpaceRoleKind::SpaceManager, SpaceRoleKind::Other]);
    }

    #[test]
    fn guid_displays_raw_identifier() {
        assert_eq!(Guid::from("space-1").to_string(), "space-1");
    }
}

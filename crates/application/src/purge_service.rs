//! Space deletion with an application-level fallback.

use std::sync::Arc;

use spacewarden_core::AppResult;
use spacewarden_domain::Space;
use tracing::{info, warn};

use crate::lifecycle_ports::PlatformClient;

/// Application service that removes expired spaces.
#[derive(Clone)]
pub struct PurgeService {
    platform: Arc<dyn PlatformClient>,
}

impl PurgeService {
    /// Creates a new purge service.
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformClient>) -> Self {
        Self { platform }
    }

    /// Deletes a space together with its contents.
    ///
    /// When the recursive space delete fails, every application in the space
    /// is deleted one by one. The first failing application delete is
    /// returned. If all of them succeed the original space error is still
    /// returned, because the space object itself is left behind.
    pub async fn purge_space(&self, space: &Space) -> AppResult<()> {
        let Err(space_error) = self.platform.delete_space(&space.guid, true).await else {
            info!(space = %space.guid, space_name = %space.name, "space purged");
            return Ok(());
        };

        warn!(
            space = %space.guid,
            space_name = %space.name,
            error = %space_error,
            "space delete failed, deleting applications individually"
        );

        let applications = self
            .platform
            .list_applications_by_space(&space.guid)
            .await?;

        for application in applications {
            self.platform.delete_application(&application.guid).await?;
            info!(
                space = %space.guid,
                application = %application.guid,
                application_name = %application.name,
                "application deleted"
            );
        }

        Err(space_error)
    }
}

#[cfg(test)]
mod tests;

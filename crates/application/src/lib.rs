//! Application services and ports.

#![forbid(unsafe_code)]

mod lifecycle_ports;
mod purge_service;
mod sandbox_lifecycle_service;

#[cfg(test)]
mod test_support;

pub use lifecycle_ports::{
    NotificationSender, OrganizationResources, PlatformClient, TemplateRenderer,
};
pub use purge_service::PurgeService;
pub use sandbox_lifecycle_service::{
    LifecycleRunSummary, NOTIFY_TEMPLATE, OrganizationOutcome, PURGE_TEMPLATE,
    SandboxLifecycleConfig, SandboxLifecycleService,
};

//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod email;
mod lifecycle;
mod platform;
mod recipients;

pub use email::EmailAddress;
pub use lifecycle::{
    ClassificationReport, LifecyclePolicy, LifecycleStage, ResourcesBySpace, SpaceClassification,
    age_in_days, classify_spaces, earliest_creation, parse_created_at, truncate_to_day,
};
pub use platform::{
    Application, Guid, Organization, ResourceKind, ServiceInstance, Space, SpaceResource,
    SpaceRole, SpaceRoleKind,
};
pub use recipients::SpaceRecipients;

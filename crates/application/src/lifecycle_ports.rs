mod notification;
mod platform;

pub use notification::{NotificationSender, TemplateRenderer};
pub use platform::{OrganizationResources, PlatformClient};

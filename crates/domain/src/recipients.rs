//! Who gets mailed about a space.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{EmailAddress, Guid, SpaceRole, SpaceRoleKind};

/// People to contact about a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRecipients {
    /// Usernames that are deliverable email addresses.
    pub addresses: Vec<String>,
    /// Users holding the developer role.
    pub developers: Vec<Guid>,
    /// Users holding the manager role.
    pub managers: Vec<Guid>,
}

impl SpaceRecipients {
    /// Collects recipients from the roles of a space.
    ///
    /// Role holders outside `eligible_users` are ignored. Usernames that do not
    /// parse as email addresses are left out of `addresses` but the user still
    /// counts as a developer or manager.
    #[must_use]
    pub fn from_roles(eligible_users: &HashSet<Guid>, roles: &[SpaceRole]) -> Self {
        let mut recipients = Self::default();

        for role in roles {
            if !eligible_users.contains(&role.user_guid) {
                continue;
            }

            if let Ok(address) = EmailAddress::new(role.username.as_str()) {
                recipients.addresses.push(address.into());
            }

            for kind in &role.roles {
                match kind {
                    SpaceRoleKind::SpaceDeveloper => {
                        recipients.developers.push(role.user_guid.clone());
                    }
                    SpaceRoleKind::SpaceManager => {
                        recipients.managers.push(role.user_guid.clone());
                    }
                    SpaceRoleKind::SpaceAuditor | SpaceRoleKind::Other => {}
                }
            }
        }

        recipients
    }

    /// Returns true when nobody can be emailed.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::SpaceRecipients;
    use crate::{Guid, SpaceRole, SpaceRoleKind};

    fn role(user: &str, username: &str, roles: Vec<SpaceRoleKind>) -> SpaceRole {
        SpaceRole {
            user_guid: Guid::from(user),
            username: username.to_owned(),
            roles,
        }
    }

    #[test]
    fn only_eligible_users_are_collected() {
        let eligible: HashSet<Guid> = [Guid::from("u-1")].into_iter().collect();
        let roles = vec![
            role("u-1", "one@example.com", vec![SpaceRoleKind::SpaceDeveloper]),
            role("u-2", "two@example.com", vec![SpaceRoleKind::SpaceManager]),
        ];

        let recipients = SpaceRecipients::from_roles(&eligible, &roles);

        assert_eq!(recipients.addresses, vec!["one@example.com".to_owned()]);
        assert_eq!(recipients.developers, vec![Guid::from("u-1")]);
        assert!(recipients.managers.is_empty());
    }

    #[test]
    fn non_email_usernames_still_count_for_roles() {
        let eligible: HashSet<Guid> = [Guid::from("u-1")].into_iter().collect();
        let roles = vec![role(
            "u-1",
            "admin",
            vec![SpaceRoleKind::SpaceDeveloper, SpaceRoleKind::SpaceManager],
        )];

        let recipients = SpaceRecipients::from_roles(&eligible, &roles);

        assert!(recipients.is_unreachable());
        assert_eq!(recipients.developers, vec![Guid::from("u-1")]);
        assert_eq!(recipients.managers, vec![Guid::from("u-1")]);
    }

    #[test]
    fn auditors_are_addressed_but_not_classified() {
        let eligible: HashSet<Guid> = [Guid::from("u-3")].into_iter().collect();
        let roles = vec![role(
            "u-3",
            "audit@example.com",
            vec![SpaceRoleKind::SpaceAuditor],
        )];

        let recipients = SpaceRecipients::from_roles(&eligible, &roles);

        assert_eq!(recipients.addresses.len(), 1);
        assert!(recipients.developers.is_empty());
        assert!(recipients.managers.is_empty());
    }

    #[test]
    fn unparseable_username_does_not_drop_other_members() {
        let eligible: HashSet<Guid> = [Guid::from("u-1"), Guid::from("u-2")]
            .into_iter()
            .collect();
        let roles = vec![
            role("u-1", "good@agency.gov", vec![SpaceRoleKind::SpaceDeveloper]),
            role("u-2", "a,b@agency.gov", vec![SpaceRoleKind::SpaceManager]),
        ];

        let recipients = SpaceRecipients::from_roles(&eligible, &roles);

        assert_eq!(recipients.addresses, vec!["good@agency.gov".to_owned()]);
        assert_eq!(recipients.managers, vec![Guid::from("u-2")]);
    }
}

//! Project user domain types

use serde::{Deserialize, Serialize};

use super::{Links, SELF_LINK, id_from_uri, self_link};
use crate::envelope::{Listed, Resource};

wire_enum! {
    /// Membership status of a user within a project.
    UserStatus {
        "ENABLED" => Enabled,
        "DISABLED" => Disabled,
    }
}

/// A user's membership in a project.
///
/// The `self` link points at the user's account profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub content: UserContent,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub user_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
}

impl Resource for User {
    const ROOT: &'static str = "user";
}

impl Listed for User {
    const COLLECTION: &'static str = "users";
}

impl User {
    /// An enabled membership of the account at `profile_uri` with `roles`.
    pub fn new(profile_uri: impl Into<String>, roles: Vec<String>) -> Self {
        let mut links = Links::new();
        links.insert(SELF_LINK.to_string(), profile_uri.into());
        Self {
            content: UserContent {
                status: Some(UserStatus::Enabled),
                user_roles: roles,
                ..Default::default()
            },
            links,
        }
    }

    /// Account profile URI of the user.
    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    /// Account identifier of the user.
    pub fn id(&self) -> Option<&str> {
        self.uri().map(id_from_uri)
    }

    pub fn roles(&self) -> &[String] {
        &self.content.user_roles
    }

    pub fn is_enabled(&self) -> bool {
        self.content.status == Some(UserStatus::Enabled)
    }

    /// Enable or disable the membership.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.content.status = Some(if enabled {
            UserStatus::Enabled
        } else {
            UserStatus::Disabled
        });
    }

    /// Replace the roles held by the user.
    pub fn set_roles(&mut self, roles: Vec<String>) {
        self.content.user_roles = roles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use serde_json::json;

    #[test]
    fn test_deserialize_user() {
        let user = serde_json::from_value::<Envelope<User>>(json!({
            "user": {
                "content": {
                    "status": "ENABLED",
                    "userRoles": ["/gdc/projects/11/roles/2"],
                    "login": "jane@example.com",
                    "email": "jane@example.com",
                    "firstname": "Jane",
                    "lastname": "Doe"
                },
                "links": {"self": "/gdc/account/profile/17"}
            }
        }))
        .unwrap()
        .into_inner();

        assert_eq!(user.id(), Some("17"));
        assert!(user.is_enabled());
        assert_eq!(user.roles(), ["/gdc/projects/11/roles/2".to_string()]);
        assert_eq!(user.content.firstname.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_new_user_payload() {
        let mut user = User::new("/gdc/account/profile/17", vec!["/r/1".to_string()]);
        user.set_enabled(false);

        let value = serde_json::to_value(Envelope(user)).unwrap();
        assert_eq!(
            value,
            json!({
                "user": {
                    "content": {"status": "DISABLED", "userRoles": ["/r/1"]},
                    "links": {"self": "/gdc/account/profile/17"}
                }
            })
        );
    }
}

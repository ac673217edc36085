//! Account domain types

use serde::{Deserialize, Serialize};

use super::{Links, id_from_uri, self_link};
use crate::envelope::{Listed, Resource};

/// URI of the account of the logged-in user.
pub const CURRENT_ACCOUNT_URI: &str = "/gdc/account/profile/current";

/// A GoodData user account (profile).
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Only sent when creating or updating an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Only sent when creating or updating an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication_modes: Vec<String>,
    #[serde(
        default,
        with = "crate::format::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(
        default,
        with = "crate::format::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl Resource for Account {
    const ROOT: &'static str = "accountSetting";
}

impl Listed for Account {
    const COLLECTION: &'static str = "accountSettings";
}

impl Account {
    /// Payload for creating a new account.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let login = login.into();
        let password = password.into();
        Self {
            email: Some(login.clone()),
            login: Some(login),
            verify_password: Some(password.clone()),
            password: Some(password),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Default::default()
        }
    }

    /// Profile URI of the account.
    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    /// Account identifier, derived from its URI.
    pub fn id(&self) -> Option<&str> {
        self.uri().map(id_from_uri)
    }

    /// URI listing the projects the account belongs to.
    pub fn projects_uri(&self) -> Option<&str> {
        self.links.get("projects").map(String::as_str)
    }
}

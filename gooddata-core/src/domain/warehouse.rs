//! Data warehouse domain types

use serde::{Deserialize, Serialize};

use super::{Environment, Links, id_from_uri, self_link};
use crate::envelope::{Listed, Resource};

/// URI of the warehouse instance collection.
pub const WAREHOUSES_URI: &str = "/gdc/datawarehouse/instances";

/// Name of the schema every warehouse is created with.
pub const DEFAULT_SCHEMA_NAME: &str = "default";

wire_enum! {
    /// Lifecycle state of a warehouse instance.
    WarehouseStatus {
        "ENABLED" => Enabled,
        "DISABLED" => Disabled,
        "DELETED" => Deleted,
        "PREPARING" => Preparing,
        "ERROR" => Error,
    }
}

wire_enum! {
    /// Role of a user within a warehouse.
    WarehouseUserRole {
        "admin" => Admin,
        "dataAdmin" => DataAdmin,
        "editor" => Editor,
    }
}

/// A data warehouse instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WarehouseStatus>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl Resource for Warehouse {
    const ROOT: &'static str = "instance";
}

impl Listed for Warehouse {
    const COLLECTION: &'static str = "instances";
}

impl Warehouse {
    /// Payload for creating a new warehouse.
    pub fn new(title: impl Into<String>, authorization_token: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authorization_token: Some(authorization_token.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    pub fn id(&self) -> Option<&str> {
        self.uri().map(id_from_uri)
    }

    /// JDBC connection string of the warehouse.
    pub fn jdbc_connection_string(&self) -> Option<&str> {
        self.connection_url.as_deref()
    }

    pub fn users_uri(&self) -> Option<&str> {
        self.links.get("users").map(String::as_str)
    }

    pub fn schemas_uri(&self) -> Option<&str> {
        self.links.get("schemas").map(String::as_str)
    }
}

/// A user's membership in a warehouse.
///
/// Exactly one of `profile` and `login` identifies the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseUser {
    pub role: WarehouseUserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl Resource for WarehouseUser {
    const ROOT: &'static str = "user";
}

impl Listed for WarehouseUser {
    const COLLECTION: &'static str = "users";
}

impl WarehouseUser {
    /// Membership of the account at `profile_uri`.
    pub fn for_profile(role: WarehouseUserRole, profile_uri: impl Into<String>) -> Self {
        Self {
            role,
            profile: Some(profile_uri.into()),
            login: None,
            links: Links::new(),
        }
    }

    /// Membership of the account with `login`.
    pub fn for_login(role: WarehouseUserRole, login: impl Into<String>) -> Self {
        Self {
            role,
            profile: None,
            login: Some(login.into()),
            links: Links::new(),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    pub fn id(&self) -> Option<&str> {
        self.uri().map(id_from_uri)
    }
}

/// A schema within a warehouse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl Resource for WarehouseSchema {
    const ROOT: &'static str = "schema";
}

impl Listed for WarehouseSchema {
    const COLLECTION: &'static str = "schemas";
}

impl WarehouseSchema {
    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_SCHEMA_NAME
    }
}

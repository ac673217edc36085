//! Project role domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Links, Meta};
use crate::envelope::Resource;
use crate::format::Flag;

/// A role users can hold within a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// URI the role was fetched from. Not part of the JSON payload.
    #[serde(skip)]
    pub uri: Option<String>,
    pub meta: Meta,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

/// Permission flags of a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub permission: BTreeMap<String, Flag>,
}

impl Resource for Role {
    const ROOT: &'static str = "projectRole";
}

impl Role {
    pub fn new(meta: Meta, permissions: Permissions, links: Links) -> Self {
        Self {
            uri: None,
            meta,
            permissions,
            links,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    /// Role identifier such as `adminRole` or `editorRole`.
    pub fn identifier(&self) -> Option<&str> {
        self.meta.identifier.as_deref()
    }

    /// Whether the role grants `permission`. Unknown permissions are denied.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .permission
            .get(permission)
            .is_some_and(|flag| flag.0)
    }

    /// URI listing the users holding this role.
    pub fn users_uri(&self) -> Option<&str> {
        self.links.get("roleUsers").map(String::as_str)
    }
}

/// Role URIs of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleUris {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Resource for RoleUris {
    const ROOT: &'static str = "projectRoles";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use serde_json::json;

    #[test]
    fn test_deserialize_role() {
        let role = serde_json::from_value::<Envelope<Role>>(json!({
            "projectRole": {
                "permissions": {
                    "permission": {
                        "canCreateReport": "1",
                        "canManageProject": "0"
                    }
                },
                "links": {"roleUsers": "/gdc/projects/11/roles/2/users"},
                "meta": {"title": "Editor", "identifier": "editorRole"}
            }
        }))
        .unwrap()
        .into_inner();

        assert_eq!(role.title(), "Editor");
        assert_eq!(role.identifier(), Some("editorRole"));
        assert!(role.has_permission("canCreateReport"));
        assert!(!role.has_permission("canManageProject"));
        assert!(!role.has_permission("canFly"));
        assert_eq!(role.users_uri(), Some("/gdc/projects/11/roles/2/users"));
        assert!(role.uri().is_none());
    }

    #[test]
    fn test_deserialize_role_uris() {
        let uris = serde_json::from_value::<Envelope<RoleUris>>(json!({
            "projectRoles": {
                "roles": ["/gdc/projects/11/roles/1", "/gdc/projects/11/roles/2"]
            }
        }))
        .unwrap()
        .into_inner();

        assert_eq!(uris.roles.len(), 2);
    }
}

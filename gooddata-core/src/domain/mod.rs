//! Domain types
//!
//! DTOs mirroring GoodData server resources. They carry no lifecycle logic:
//! they are deserialized on demand and reflect the last successful fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod account;
pub mod project;
pub mod role;
pub mod user;
pub mod warehouse;

/// Named links of a resource (`self`, `parent`, `users`, ...).
pub type Links = BTreeMap<String, String>;

/// Key of the link pointing at the resource itself.
pub const SELF_LINK: &str = "self";

/// Returns the identifier of a resource given its URI: the last non-empty
/// path segment, without any query string.
///
/// ```
/// use gooddata_core::domain::id_from_uri;
///
/// assert_eq!(id_from_uri("/gdc/projects/abc123"), "abc123");
/// assert_eq!(id_from_uri("/gdc/account/profile/42/"), "42");
/// ```
pub fn id_from_uri(uri: &str) -> &str {
    let path = uri.split('?').next().unwrap_or(uri);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

wire_enum! {
    /// Deployment environment of a project or warehouse.
    Environment {
        "PRODUCTION" => Production,
        "DEVELOPMENT" => Development,
        "TESTING" => Testing,
    }
}

/// Metadata block shared by most resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
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
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl Meta {
    /// Metadata with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Looks up the `self` link.
pub(crate) fn self_link(links: &Links) -> Option<&str> {
    links.get(SELF_LINK).map(String::as_str)
}

//! Project domain types

use serde::{Deserialize, Serialize};

use super::{Environment, Links, Meta, id_from_uri, self_link};
use crate::envelope::{Envelope, Listed, Resource};
use crate::format::Flag;

/// URI of the project collection.
pub const PROJECTS_URI: &str = "/gdc/projects";

wire_enum! {
    /// Lifecycle state of a project.
    ProjectState {
        "ENABLED" => Enabled,
        "DELETED" => Deleted,
        "ARCHIVED" => Archived,
        "PREPARING" => Preparing,
        "LOADING" => Loading,
        "DISABLED" => Disabled,
    }
}

impl ProjectState {
    /// Whether the project is still being provisioned.
    pub fn is_pending(&self) -> bool {
        matches!(self, ProjectState::Preparing | ProjectState::Loading)
    }
}

/// A GoodData project (workspace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub meta: Meta,
    pub content: ProjectContent,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

/// Project settings and state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ProjectState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guided_navigation: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
}

impl Resource for Project {
    const ROOT: &'static str = "project";
}

impl Listed for Project {
    const COLLECTION: &'static str = "projects";
}

impl Project {
    /// Payload for creating a new project.
    pub fn new(title: impl Into<String>, authorization_token: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(title),
            content: ProjectContent {
                environment: Some(Environment::Production),
                driver: Some("Pg".to_string()),
                guided_navigation: Some(Flag(true)),
                authorization_token: Some(authorization_token.into()),
                ..Default::default()
            },
            links: Links::new(),
        }
    }

    /// URI of the project, once it exists on the server.
    pub fn uri(&self) -> Option<&str> {
        self_link(&self.links)
    }

    /// Project identifier, derived from its URI.
    pub fn id(&self) -> Option<&str> {
        self.uri().map(id_from_uri)
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn state(&self) -> Option<&ProjectState> {
        self.content.state.as_ref()
    }

    /// URI of the project's user collection.
    pub fn users_uri(&self) -> Option<&str> {
        self.links.get("users").map(String::as_str)
    }

    /// URI of the project's role collection.
    pub fn roles_uri(&self) -> Option<&str> {
        self.links.get("roles").map(String::as_str)
    }
}

/// A template a project can be created from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub meta: Meta,
}

impl Resource for ProjectTemplate {
    const ROOT: &'static str = "projectTemplate";
}

/// Templates a project was created from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTemplates {
    #[serde(default)]
    pub templates: Vec<Envelope<ProjectTemplate>>,
}

impl Resource for ProjectTemplates {
    const ROOT: &'static str = "projectTemplates";
}

impl ProjectTemplates {
    pub fn into_templates(self) -> Vec<ProjectTemplate> {
        self.templates.into_iter().map(Envelope::into_inner).collect()
    }
}

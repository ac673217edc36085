//! Project API endpoints

use async_trait::async_trait;
use gooddata_core::collections::{Page, PageRequest};
use gooddata_core::domain::account::Account;
use gooddata_core::domain::project::{
    PROJECTS_URI, Project, ProjectState, ProjectTemplate, ProjectTemplates,
};
use gooddata_core::domain::role::{Role, RoleUris};
use gooddata_core::domain::user::User;
use gooddata_core::dto::UriResponse;
use gooddata_core::dto::task::{AsyncTask, TaskStatus};
use gooddata_core::dto::users::{ProjectUsersUpdateResult, UsersUpdate};
use gooddata_core::dto::validation::{
    AvailableValidations, ProjectValidationResults, ProjectValidationType, ValidateProject,
};
use gooddata_core::envelope::Envelope;
use tracing::{debug, info};

use crate::accounts::AccountService;
use crate::error::{Error, ResourceKind, Result, require};
use crate::http::{RawResponse, RestClient};
use crate::poll::{FutureResult, PollHandler};

/// URI of the project with `id`
pub fn project_uri(id: &str) -> String {
    format!("{PROJECTS_URI}/{id}")
}

/// Service for projects, their users and roles
#[derive(Debug, Clone)]
pub struct ProjectService {
    client: RestClient,
    accounts: AccountService,
}

impl ProjectService {
    pub(crate) fn new(client: RestClient, accounts: AccountService) -> Self {
        Self { client, accounts }
    }

    // =============================================================================
    // Projects
    // =============================================================================

    /// All projects the logged-in user has access to
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let uri = self.current_projects_uri().await?;
        self.client.get_all(&uri).await
    }

    /// One page of the projects the logged-in user has access to
    pub async fn list_projects(&self, page: &PageRequest) -> Result<Page<Project>> {
        let uri = self.current_projects_uri().await?;
        self.client.get_page(&uri, page).await
    }

    /// Create a project
    ///
    /// # Returns
    /// A [`FutureResult`] resolving to the project once it is enabled. It
    /// fails with [`Error::Client`] when provisioning ends in any other state.
    pub async fn create_project(&self, project: &Project) -> Result<FutureResult<Project>> {
        if project
            .content
            .authorization_token
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(Error::invalid_argument(
                "project authorization token must be set",
            ));
        }

        let created: UriResponse = self
            .client
            .post(PROJECTS_URI, &Envelope(project.clone()))
            .await?
            .json()?;

        info!(title = project.title(), uri = %created.uri, "project creation started");
        Ok(FutureResult::new(
            self.client.clone(),
            ProjectCreation { uri: created.uri },
        ))
    }

    /// Get a project by its URI
    ///
    /// # Errors
    /// [`Error::NotFound`] when no project lives at `uri`
    pub async fn get_project_by_uri(&self, uri: &str) -> Result<Project> {
        let uri = require(uri, "project uri")?;
        self.client
            .get(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Project, uri))
    }

    /// Get a project by its identifier
    pub async fn get_project_by_id(&self, id: &str) -> Result<Project> {
        let id = require(id, "project id")?;
        self.get_project_by_uri(&project_uri(id)).await
    }

    /// Delete a project
    pub async fn remove_project(&self, project: &Project) -> Result<()> {
        let uri = project_uri(project_id(project)?);
        self.client
            .delete(&uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Project, &uri))?;
        info!(uri = %uri, "project removed");
        Ok(())
    }

    /// Templates the project was created from
    pub async fn get_project_templates(&self, project: &Project) -> Result<Vec<ProjectTemplate>> {
        let uri = format!("/gdc/md/{}/templates", project_id(project)?);
        let templates: ProjectTemplates = self.client.get(&uri).await?;
        Ok(templates.into_templates())
    }

    // =============================================================================
    // Validation
    // =============================================================================

    /// Validations the server can run on the project
    pub async fn get_available_validation_types(
        &self,
        project: &Project,
    ) -> Result<Vec<ProjectValidationType>> {
        let uri = validation_uri(project)?;
        let available: AvailableValidations = self.client.get(&uri).await?;
        Ok(available.available_validations)
    }

    /// Start validating the project
    ///
    /// An empty `types` runs every validation the server offers.
    pub async fn validate_project(
        &self,
        project: &Project,
        types: &[ProjectValidationType],
    ) -> Result<FutureResult<ProjectValidationResults>> {
        let uri = validation_uri(project)?;
        let types = if types.is_empty() {
            self.get_available_validation_types(project).await?
        } else {
            types.to_vec()
        };

        let task: AsyncTask = self
            .client
            .post(&uri, &ValidateProject { validate_project: types })
            .await?
            .resource()?;

        let poll_uri = task
            .poll_uri()
            .ok_or_else(|| Error::Client("validation task has no poll link".to_string()))?;

        debug!(uri = %uri, poll_uri, "project validation started");
        Ok(FutureResult::new(
            self.client.clone(),
            ProjectValidation {
                uri: poll_uri.to_string(),
            },
        ))
    }

    // =============================================================================
    // Users and roles
    // =============================================================================

    /// All users of the project
    pub async fn get_users(&self, project: &Project) -> Result<Vec<User>> {
        self.client.get_all(&users_uri(project)?).await
    }

    /// One page of the users of the project
    pub async fn list_users(&self, project: &Project, page: &PageRequest) -> Result<Page<User>> {
        self.client.get_page(&users_uri(project)?, page).await
    }

    /// The project membership of `account`
    pub async fn get_user(&self, project: &Project, account: &Account) -> Result<User> {
        let users_uri = users_uri(project)?;
        let account_id = account
            .id()
            .ok_or_else(|| Error::invalid_argument("account has no self link"))?;

        let uri = format!("{users_uri}/{account_id}");
        self.client
            .get(&uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::User, &uri))
    }

    /// Add `account` to the project with the given role URIs
    pub async fn add_user_to_project(
        &self,
        project: &Project,
        account: &Account,
        roles: &[String],
    ) -> Result<User> {
        let profile = account
            .uri()
            .ok_or_else(|| Error::invalid_argument("account has no self link"))?;

        self.post_users(project, vec![User::new(profile, roles.to_vec())])
            .await?;
        info!(project = project_id(project)?, profile, "user added to project");

        self.get_user(project, account).await
    }

    /// Store changed memberships (roles, status) of project users
    pub async fn update_user_in_project(&self, project: &Project, users: &[User]) -> Result<()> {
        if users.is_empty() {
            return Err(Error::invalid_argument("no users to update"));
        }
        if users.iter().any(|u| u.uri().is_none()) {
            return Err(Error::invalid_argument("user has no self link"));
        }

        self.post_users(project, users.to_vec()).await
    }

    /// Roles defined in the project
    pub async fn get_roles(&self, project: &Project) -> Result<Vec<Role>> {
        let uri = format!("{}/roles", project_uri(project_id(project)?));
        let role_uris: RoleUris = self.client.get(&uri).await?;

        let mut roles = Vec::with_capacity(role_uris.roles.len());
        for role_uri in &role_uris.roles {
            roles.push(self.get_role_by_uri(role_uri).await?);
        }
        Ok(roles)
    }

    /// Get a role by its URI
    pub async fn get_role_by_uri(&self, uri: &str) -> Result<Role> {
        let uri = require(uri, "role uri")?;
        let mut role: Role = self
            .client
            .get(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Role, uri))?;
        role.uri = Some(uri.to_string());
        Ok(role)
    }

    async fn post_users(&self, project: &Project, users: Vec<User>) -> Result<()> {
        let result: ProjectUsersUpdateResult = self
            .client
            .post(&users_uri(project)?, &UsersUpdate::new(users))
            .await?
            .resource()?;

        if result.has_failures() {
            let details = result
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.user, f.message))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::Client(format!(
                "failed to update users of project: {details}"
            )));
        }
        Ok(())
    }

    async fn current_projects_uri(&self) -> Result<String> {
        let account = self.accounts.get_current().await?;
        let id = account
            .id()
            .ok_or_else(|| Error::Client("current account has no self link".to_string()))?;
        Ok(format!("/gdc/account/profile/{id}/projects"))
    }
}

fn project_id(project: &Project) -> Result<&str> {
    project
        .id()
        .ok_or_else(|| Error::invalid_argument("project has no self link"))
}

fn users_uri(project: &Project) -> Result<String> {
    Ok(format!("{}/users", project_uri(project_id(project)?)))
}

fn validation_uri(project: &Project) -> Result<String> {
    Ok(format!("/gdc/md/{}/validate", project_id(project)?))
}

/// Polls a new project until provisioning ends
struct ProjectCreation {
    uri: String,
}

#[async_trait]
impl PollHandler for ProjectCreation {
    type Output = Project;

    fn polling_uri(&self) -> &str {
        &self.uri
    }

    async fn handle_result(
        &self,
        _: &RestClient,
        response: RawResponse,
    ) -> Result<Option<Project>> {
        let project: Project = response.resource()?;
        match project.state() {
            Some(ProjectState::Enabled) => {
                info!(uri = %self.uri, "project created");
                Ok(Some(project))
            }
            Some(ProjectState::Deleted | ProjectState::Archived | ProjectState::Disabled) => {
                Err(Error::Client(format!("project creation failed: {}", self.uri)))
            }
            _ => Ok(None),
        }
    }

    fn handle_error(&self, error: Error) -> Error {
        error.or_not_found(ResourceKind::Project, &self.uri)
    }
}

/// Polls a validation task until its results are available
struct ProjectValidation {
    uri: String,
}

#[async_trait]
impl PollHandler for ProjectValidation {
    type Output = ProjectValidationResults;

    fn polling_uri(&self) -> &str {
        &self.uri
    }

    async fn handle_result(
        &self,
        _: &RestClient,
        response: RawResponse,
    ) -> Result<Option<ProjectValidationResults>> {
        // While running, the task answers with its status instead of results.
        if let Ok(Envelope(status)) = response.json::<Envelope<TaskStatus>>() {
            if status.is_error() {
                return Err(Error::Client(format!(
                    "project validation failed: {}",
                    self.uri
                )));
            }
            return Ok(None);
        }

        response.resource().map(Some)
    }
}

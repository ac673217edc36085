//! Project membership update DTOs

use serde::{Deserialize, Serialize};

use crate::domain::user::User;
use crate::envelope::{Envelope, Resource};

/// Body of a bulk membership update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersUpdate {
    pub users: Vec<Envelope<User>>,
}

impl UsersUpdate {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(Envelope).collect(),
        }
    }
}

/// Outcome of a bulk membership update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUsersUpdateResult {
    /// URIs of users updated successfully.
    #[serde(default)]
    pub successful: Vec<String>,
    #[serde(default)]
    pub failed: Vec<FailedUser>,
}

/// A user the update could not be applied to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailedUser {
    pub user: String,
    #[serde(default)]
    pub message: String,
}

impl Resource for ProjectUsersUpdateResult {
    const ROOT: &'static str = "projectUsersUpdateResult";
}

impl ProjectUsersUpdateResult {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

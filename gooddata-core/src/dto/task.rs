//! Asynchronous task DTOs

use serde::{Deserialize, Serialize};

use crate::domain::Links;
use crate::envelope::Resource;

/// Handle of a server-side task.
///
/// Returned when a task is started; the `poll` link is then queried until
/// the task finishes. Finished tasks may carry further links to the result
/// (e.g. `instance` for a created warehouse).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsyncTask {
    #[serde(default, alias = "link")]
    pub links: Links,
}

impl Resource for AsyncTask {
    const ROOT: &'static str = "asyncTask";
}

impl AsyncTask {
    /// URI to poll for the task status.
    pub fn poll_uri(&self) -> Option<&str> {
        self.link("poll")
    }

    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }
}

/// Status of a running metadata task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<serde_json::Value>,
}

impl Resource for TaskStatus {
    const ROOT: &'static str = "wTaskStatus";
}

impl TaskStatus {
    pub fn is_running(&self) -> bool {
        self.status == "RUNNING"
    }

    pub fn is_error(&self) -> bool {
        self.status == "ERROR"
    }
}

//! Data Transfer Objects
//!
//! Request and response payloads that are not resources in their own right:
//! task handles, login exchanges, error bodies and bulk update results.

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod error;
pub mod task;
pub mod users;
pub mod validation;

/// Response of endpoints that create a resource and answer with its URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriResponse {
    pub uri: String,
}

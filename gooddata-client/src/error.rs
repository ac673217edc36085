//! Error types for the GoodData client

use gooddata_core::dto::error::ErrorStructure;
use gooddata_core::envelope::Envelope;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Response header carrying the server-side request id.
pub const REQUEST_ID_HEADER: &str = "x-gdc-request";

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of resource a lookup was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Role,
    User,
    Account,
    Warehouse,
    WarehouseUser,
    WarehouseSchema,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Project => "project",
            ResourceKind::Role => "role",
            ResourceKind::User => "user",
            ResourceKind::Account => "account",
            ResourceKind::Warehouse => "warehouse",
            ResourceKind::WarehouseUser => "warehouse user",
            ResourceKind::WarehouseSchema => "warehouse schema",
        })
    }
}

/// A non-success HTTP response, with whatever detail the server provided.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RestError {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase of the status
    pub status_text: Option<String>,
    /// Server-side request id, for support tickets
    pub request_id: Option<String>,
    /// Error message with its parameters filled in
    pub message: Option<String>,
    pub component: Option<String>,
    pub error_class: Option<String>,
    pub error_code: Option<String>,
    pub trace: Option<String>,
}

impl RestError {
    /// Build an error from a response's status, headers and body.
    ///
    /// The body is parsed as a GoodData error structure when possible; a body
    /// in any other shape is kept verbatim as the message.
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let header_request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut error = Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            request_id: header_request_id,
            message: None,
            component: None,
            error_class: None,
            error_code: None,
            trace: None,
        };

        match serde_json::from_slice::<Envelope<ErrorStructure>>(body) {
            Ok(Envelope(structure)) => {
                error.message = structure.formatted_message();
                error.request_id = structure.request_id.or(error.request_id);
                error.component = structure.component;
                error.error_class = structure.error_class;
                error.error_code = structure.error_code;
                error.trace = structure.trace;
            }
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                if !text.is_empty() {
                    error.message = Some(text);
                }
            }
        }

        error
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(text) = &self.status_text {
            write!(f, " {text}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request_id={request_id}]")?;
        }
        Ok(())
    }
}

/// Errors that can occur when using the GoodData client
#[derive(Debug, Error)]
pub enum Error {
    /// The requested resource does not exist
    #[error("{resource} {uri} was not found")]
    NotFound {
        resource: ResourceKind,
        uri: String,
        #[source]
        source: Option<RestError>,
    },

    /// API returned an error status code
    #[error("API error: {0}")]
    Rest(#[from] RestError),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body could not be converted to or from JSON
    #[error("Invalid JSON for {uri}: {source}")]
    Parse {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server reported a failure without an error status
    #[error("{0}")]
    Client(String),

    /// An argument was rejected before any request was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Polling did not finish in time
    #[error("Polling {uri} timed out after {elapsed:?}")]
    Timeout { uri: String, elapsed: Duration },

    /// Polling was cancelled
    #[error("Polling was cancelled")]
    Cancelled,

    /// Login or token exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// HTTP status code behind this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rest(e) => Some(e.status),
            Self::NotFound { source, .. } => Some(source.as_ref().map_or(404, |e| e.status)),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.status() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }

    /// Turn a 404 into a typed [`Error::NotFound`] for `resource` at `uri`.
    /// Every other error is returned unchanged.
    pub fn or_not_found(self, resource: ResourceKind, uri: impl Into<String>) -> Self {
        match self {
            Self::Rest(e) if e.status == 404 => Self::NotFound {
                resource,
                uri: uri.into(),
                source: Some(e),
            },
            other => other,
        }
    }
}

/// Reject an empty `value` before any request is made.
pub(crate) fn require<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(value)
}

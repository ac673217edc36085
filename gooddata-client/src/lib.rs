//! GoodData HTTP Client
//!
//! A typed client for the GoodData platform REST API: projects, warehouses,
//! users, roles and accounts.
//!
//! All services share one [`RestClient`], so they share its connection pool,
//! session token and [`GoodDataSettings`]. Operations that start a task on
//! the server return a [`FutureResult`] which polls until the task finishes.
//!
//! # Example
//!
//! ```no_run
//! use gooddata_client::GoodData;
//! use gooddata_core::domain::project::Project;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gd = GoodData::new("secure.gooddata.com", "jane@example.com", "secret")?;
//!
//!     let project = gd
//!         .project_service()
//!         .create_project(&Project::new("Demo", "AUTH_TOKEN"))
//!         .await?
//!         .get()
//!         .await?;
//!
//!     println!("Created project: {:?}", project.id());
//!     gd.logout().await?;
//!     Ok(())
//! }
//! ```

mod accounts;
mod auth;
pub mod error;
mod http;
pub mod poll;
mod projects;
pub mod settings;
mod warehouses;

// Re-export commonly used types
pub use accounts::{AccountService, account_uri, domain_users_uri};
pub use auth::{Credentials, SST_HEADER, TT_HEADER};
pub use error::{Error, ResourceKind, RestError, Result};
pub use gooddata_core::collections::{Page, PageRequest};
pub use http::{RawResponse, RestClient};
pub use poll::{FutureResult, PollHandler};
pub use projects::{ProjectService, project_uri};
pub use settings::{GoodDataEndpoint, GoodDataSettings, RetrySettings};
pub use warehouses::{WarehouseService, warehouse_uri};

/// Entry point to the GoodData API
///
/// Services are created on demand and are cheap to clone.
#[derive(Debug, Clone)]
pub struct GoodData {
    client: RestClient,
}

impl GoodData {
    /// Connect to `host` over HTTPS with default settings
    ///
    /// # Example
    /// ```
    /// use gooddata_client::GoodData;
    ///
    /// let gd = GoodData::new("secure.gooddata.com", "jane@example.com", "secret").unwrap();
    /// assert_eq!(gd.client().base_url(), "https://secure.gooddata.com");
    /// ```
    pub fn new(
        host: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_endpoint(
            &GoodDataEndpoint::new(host),
            Credentials::login_password(login, password),
            GoodDataSettings::default(),
        )
    }

    /// Connect to `endpoint` with explicit credentials and settings
    pub fn with_endpoint(
        endpoint: &GoodDataEndpoint,
        credentials: Credentials,
        settings: GoodDataSettings,
    ) -> Result<Self> {
        Ok(Self {
            client: RestClient::new(endpoint, credentials, settings)?,
        })
    }

    /// The shared HTTP client, for endpoints no service covers
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn project_service(&self) -> ProjectService {
        ProjectService::new(self.client.clone(), self.account_service())
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(self.client.clone())
    }

    pub fn warehouse_service(&self) -> WarehouseService {
        WarehouseService::new(self.client.clone())
    }

    /// End the session
    pub async fn logout(&self) -> Result<()> {
        self.account_service().logout().await
    }
}

//! Warehouse API endpoints
//!
//! Creating a warehouse and changing its users are asynchronous on the
//! server: the request answers with an `asyncTask` whose `poll` link is
//! polled until the task ends. The finished task links to its result.

use async_trait::async_trait;
use gooddata_core::collections::{Page, PageRequest};
use gooddata_core::domain::warehouse::{
    DEFAULT_SCHEMA_NAME, WAREHOUSES_URI, Warehouse, WarehouseSchema, WarehouseUser,
};
use gooddata_core::dto::task::AsyncTask;
use gooddata_core::envelope::Envelope;
use tracing::{debug, info};

use crate::error::{Error, ResourceKind, Result, require};
use crate::http::{RawResponse, RestClient};
use crate::poll::{FutureResult, PollHandler};

/// URI of the warehouse with `id`
pub fn warehouse_uri(id: &str) -> String {
    format!("{WAREHOUSES_URI}/{id}")
}

/// Service for warehouses (data warehouse instances), their users and schemas
#[derive(Debug, Clone)]
pub struct WarehouseService {
    client: RestClient,
}

impl WarehouseService {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    // =============================================================================
    // Warehouses
    // =============================================================================

    /// Create a warehouse
    ///
    /// # Returns
    /// A [`FutureResult`] resolving to the warehouse once it is provisioned
    pub async fn create_warehouse(&self, warehouse: &Warehouse) -> Result<FutureResult<Warehouse>> {
        if warehouse.title.trim().is_empty() {
            return Err(Error::invalid_argument("warehouse title must not be empty"));
        }
        if warehouse
            .authorization_token
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(Error::invalid_argument(
                "warehouse authorization token must be set",
            ));
        }

        let task: AsyncTask = self
            .client
            .post(WAREHOUSES_URI, &Envelope(warehouse.clone()))
            .await?
            .resource()?;

        let poll_uri = task_poll_uri(&task, "warehouse creation")?;
        info!(title = %warehouse.title, poll_uri, "warehouse creation started");

        Ok(FutureResult::new(
            self.client.clone(),
            WarehouseCreation {
                poll_uri: poll_uri.to_string(),
            },
        ))
    }

    /// All warehouses the logged-in user has access to
    pub async fn get_warehouses(&self) -> Result<Vec<Warehouse>> {
        self.client.get_all(WAREHOUSES_URI).await
    }

    /// One page of the warehouses the logged-in user has access to
    pub async fn list_warehouses(&self, page: &PageRequest) -> Result<Page<Warehouse>> {
        self.client.get_page(WAREHOUSES_URI, page).await
    }

    /// Get a warehouse by its identifier
    pub async fn get_warehouse_by_id(&self, id: &str) -> Result<Warehouse> {
        let id = require(id, "warehouse id")?;
        self.get_warehouse_by_uri(&warehouse_uri(id)).await
    }

    /// Get a warehouse by its URI
    ///
    /// # Errors
    /// [`Error::NotFound`] when no warehouse lives at `uri`
    pub async fn get_warehouse_by_uri(&self, uri: &str) -> Result<Warehouse> {
        let uri = require(uri, "warehouse uri")?;
        self.client
            .get(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Warehouse, uri))
    }

    /// Store changes (title, description) of a warehouse and return its new
    /// state
    pub async fn update_warehouse(&self, warehouse: &Warehouse) -> Result<Warehouse> {
        let uri = warehouse_self_uri(warehouse)?;
        self.client
            .put(uri, &Envelope(warehouse.clone()))
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Warehouse, uri))?;
        self.get_warehouse_by_uri(uri).await
    }

    /// Delete a warehouse
    pub async fn remove_warehouse(&self, warehouse: &Warehouse) -> Result<()> {
        let uri = warehouse_self_uri(warehouse)?;
        self.client
            .delete(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Warehouse, uri))?;
        info!(uri, "warehouse removed");
        Ok(())
    }

    // =============================================================================
    // Users
    // =============================================================================

    /// One page of the users of a warehouse
    pub async fn list_warehouse_users(
        &self,
        warehouse: &Warehouse,
        page: &PageRequest,
    ) -> Result<Page<WarehouseUser>> {
        let uri = users_uri(warehouse)?;
        self.client
            .get_page(&uri, page)
            .await
            .map_err(|e| {
                e.or_not_found(ResourceKind::Warehouse, warehouse_self_or(warehouse, &uri))
            })
    }

    /// Grant a user access to a warehouse
    ///
    /// # Returns
    /// A [`FutureResult`] resolving to the new membership
    pub async fn add_user_to_warehouse(
        &self,
        warehouse: &Warehouse,
        user: &WarehouseUser,
    ) -> Result<FutureResult<WarehouseUser>> {
        let uri = users_uri(warehouse)?;
        match (&user.profile, &user.login) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(Error::invalid_argument(
                    "warehouse user needs exactly one of profile and login",
                ));
            }
        }

        let task: AsyncTask = self
            .client
            .post(&uri, &Envelope(user.clone()))
            .await?
            .resource()?;

        let poll_uri = task_poll_uri(&task, "adding warehouse user")?;
        debug!(uri = %uri, poll_uri, "adding warehouse user");

        Ok(FutureResult::new(
            self.client.clone(),
            WarehouseUserAddition {
                poll_uri: poll_uri.to_string(),
            },
        ))
    }

    /// Revoke a user's access to a warehouse
    pub async fn remove_user_from_warehouse(
        &self,
        user: &WarehouseUser,
    ) -> Result<FutureResult<()>> {
        let uri = user
            .uri()
            .ok_or_else(|| Error::invalid_argument("warehouse user has no self link"))?;

        let task: AsyncTask = self
            .client
            .delete(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::WarehouseUser, uri))?
            .resource()?;

        let poll_uri = task_poll_uri(&task, "removing warehouse user")?;
        debug!(uri, poll_uri, "removing warehouse user");

        Ok(FutureResult::new(
            self.client.clone(),
            WarehouseUserRemoval {
                poll_uri: poll_uri.to_string(),
            },
        ))
    }

    // =============================================================================
    // Schemas
    // =============================================================================

    /// One page of the schemas of a warehouse
    pub async fn list_warehouse_schemas(
        &self,
        warehouse: &Warehouse,
        page: &PageRequest,
    ) -> Result<Page<WarehouseSchema>> {
        let uri = schemas_uri(warehouse)?;
        self.client
            .get_page(&uri, page)
            .await
            .map_err(|e| {
                e.or_not_found(ResourceKind::Warehouse, warehouse_self_or(warehouse, &uri))
            })
    }

    /// Get a warehouse schema by its name
    pub async fn get_warehouse_schema_by_name(
        &self,
        warehouse: &Warehouse,
        name: &str,
    ) -> Result<WarehouseSchema> {
        let name = require(name, "schema name")?;
        let uri = format!("{}/{name}", schemas_uri(warehouse)?);
        self.get_warehouse_schema_by_uri(&uri).await
    }

    /// Get a warehouse schema by its URI
    pub async fn get_warehouse_schema_by_uri(&self, uri: &str) -> Result<WarehouseSchema> {
        let uri = require(uri, "schema uri")?;
        self.client
            .get(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::WarehouseSchema, uri))
    }

    /// The schema every warehouse is created with
    pub async fn get_default_warehouse_schema(
        &self,
        warehouse: &Warehouse,
    ) -> Result<WarehouseSchema> {
        self.get_warehouse_schema_by_name(warehouse, DEFAULT_SCHEMA_NAME)
            .await
    }
}

fn warehouse_self_uri(warehouse: &Warehouse) -> Result<&str> {
    warehouse
        .uri()
        .ok_or_else(|| Error::invalid_argument("warehouse has no self link"))
}

fn warehouse_self_or<'a>(warehouse: &'a Warehouse, fallback: &'a str) -> &'a str {
    warehouse.uri().unwrap_or(fallback)
}

fn users_uri(warehouse: &Warehouse) -> Result<String> {
    match warehouse.users_uri() {
        Some(uri) => Ok(uri.to_string()),
        None => Ok(format!("{}/users", warehouse_self_uri(warehouse)?)),
    }
}

fn schemas_uri(warehouse: &Warehouse) -> Result<String> {
    match warehouse.schemas_uri() {
        Some(uri) => Ok(uri.to_string()),
        None => Ok(format!("{}/schemas", warehouse_self_uri(warehouse)?)),
    }
}

fn task_poll_uri<'a>(task: &'a AsyncTask, operation: &str) -> Result<&'a str> {
    task.poll_uri()
        .ok_or_else(|| Error::Client(format!("{operation} task has no poll link")))
}

/// Link of a finished task pointing at the task's result
fn result_link(response: &RawResponse, link: &str, operation: &str) -> Result<String> {
    let task: AsyncTask = response.resource()?;
    task.link(link)
        .map(str::to_string)
        .ok_or_else(|| Error::Client(format!("{operation} finished without a {link} link")))
}

/// Polls warehouse provisioning and fetches the new warehouse
struct WarehouseCreation {
    poll_uri: String,
}

#[async_trait]
impl PollHandler for WarehouseCreation {
    type Output = Warehouse;

    fn polling_uri(&self) -> &str {
        &self.poll_uri
    }

    async fn handle_result(
        &self,
        client: &RestClient,
        response: RawResponse,
    ) -> Result<Option<Warehouse>> {
        let uri = result_link(&response, "instance", "warehouse creation")?;
        info!(uri = %uri, "warehouse created");
        client
            .get(&uri)
            .await
            .map(Some)
            .map_err(|e| e.or_not_found(ResourceKind::Warehouse, &uri))
    }

    fn handle_error(&self, error: Error) -> Error {
        error.or_not_found(ResourceKind::Warehouse, &self.poll_uri)
    }
}

/// Polls the addition of a warehouse user and fetches the membership
struct WarehouseUserAddition {
    poll_uri: String,
}

#[async_trait]
impl PollHandler for WarehouseUserAddition {
    type Output = WarehouseUser;

    fn polling_uri(&self) -> &str {
        &self.poll_uri
    }

    async fn handle_result(
        &self,
        client: &RestClient,
        response: RawResponse,
    ) -> Result<Option<WarehouseUser>> {
        let uri = result_link(&response, "user", "adding warehouse user")?;
        client
            .get(&uri)
            .await
            .map(Some)
            .map_err(|e| e.or_not_found(ResourceKind::WarehouseUser, &uri))
    }

    fn handle_error(&self, error: Error) -> Error {
        error.or_not_found(ResourceKind::WarehouseUser, &self.poll_uri)
    }
}

/// Polls the removal of a warehouse user
struct WarehouseUserRemoval {
    poll_uri: String,
}

#[async_trait]
impl PollHandler for WarehouseUserRemoval {
    type Output = ();

    fn polling_uri(&self) -> &str {
        &self.poll_uri
    }

    async fn handle_result(&self, _: &RestClient, _: RawResponse) -> Result<Option<()>> {
        debug!(poll_uri = %self.poll_uri, "warehouse user removed");
        Ok(Some(()))
    }

    fn handle_error(&self, error: Error) -> Error {
        error.or_not_found(ResourceKind::WarehouseUser, &self.poll_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_uri_prefers_link() {
        let mut warehouse = Warehouse::new("Title", "TOKEN");
        assert!(users_uri(&warehouse).is_err());

        warehouse.links.insert(
            "self".to_string(),
            "/gdc/datawarehouse/instances/w1".to_string(),
        );
        assert_eq!(
            users_uri(&warehouse).unwrap(),
            "/gdc/datawarehouse/instances/w1/users"
        );
        assert_eq!(
            schemas_uri(&warehouse).unwrap(),
            "/gdc/datawarehouse/instances/w1/schemas"
        );

        warehouse.links.insert(
            "users".to_string(),
            "/gdc/datawarehouse/instances/w1/users?x=1".to_string(),
        );
        assert_eq!(
            users_uri(&warehouse).unwrap(),
            "/gdc/datawarehouse/instances/w1/users?x=1"
        );
    }
}

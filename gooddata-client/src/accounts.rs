//! Account API endpoints

use gooddata_core::collections::Page;
use gooddata_core::domain::account::{Account, CURRENT_ACCOUNT_URI};
use gooddata_core::dto::UriResponse;
use gooddata_core::dto::auth::LOGIN_URI;
use gooddata_core::envelope::Envelope;
use reqwest::Method;
use tracing::info;

use crate::error::{Error, ResourceKind, Result, require};
use crate::http::RestClient;

/// URI of the account with `id`
pub fn account_uri(id: &str) -> String {
    format!("/gdc/account/profile/{id}")
}

/// URI of the user collection of an organization (domain)
pub fn domain_users_uri(domain: &str) -> String {
    format!("/gdc/account/domains/{domain}/users")
}

/// Service for user accounts
#[derive(Debug, Clone)]
pub struct AccountService {
    client: RestClient,
}

impl AccountService {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Account of the logged-in user
    pub async fn get_current(&self) -> Result<Account> {
        self.client.get(CURRENT_ACCOUNT_URI).await
    }

    /// Get an account by its identifier
    pub async fn get_account_by_id(&self, id: &str) -> Result<Account> {
        let id = require(id, "account id")?;
        self.get_account_by_uri(&account_uri(id)).await
    }

    /// Get an account by its URI
    ///
    /// # Errors
    /// [`Error::NotFound`] when no account lives at `uri`
    pub async fn get_account_by_uri(&self, uri: &str) -> Result<Account> {
        let uri = require(uri, "account uri")?;
        self.client
            .get(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Account, uri))
    }

    /// Find the account with `login` among the users of `domain`
    pub async fn get_account_by_login(&self, login: &str, domain: &str) -> Result<Account> {
        let login = require(login, "login")?;
        let domain = require(domain, "domain")?;

        let uri = domain_users_uri(domain);
        let page: Page<Account> = self
            .client
            .execute(Method::GET, &uri, &[("login", login.to_string())], None)
            .await?
            .json()?;

        page.into_items()
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                resource: ResourceKind::Account,
                uri: format!("{uri}?login={login}"),
                source: None,
            })
    }

    /// Create an account in `domain` and return it as stored by the server
    pub async fn create_account(&self, account: &Account, domain: &str) -> Result<Account> {
        let domain = require(domain, "domain")?;
        if account.login.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid_argument("account login must be set"));
        }

        let created: UriResponse = self
            .client
            .post(&domain_users_uri(domain), &Envelope(account.clone()))
            .await?
            .json()?;

        info!(uri = %created.uri, "account created");
        self.get_account_by_uri(&created.uri).await
    }

    /// Store changes of an existing account
    pub async fn update_account(&self, account: &Account) -> Result<()> {
        let uri = account_self_uri(account)?;
        self.client
            .put(uri, &Envelope(account.clone()))
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Account, uri))?;
        Ok(())
    }

    /// Delete an account
    pub async fn remove_account(&self, account: &Account) -> Result<()> {
        let uri = account_self_uri(account)?;
        self.client
            .delete(uri)
            .await
            .map_err(|e| e.or_not_found(ResourceKind::Account, uri))?;
        info!(uri, "account removed");
        Ok(())
    }

    /// End the session of the logged-in user
    ///
    /// Further requests with the same client fail unless it was created with
    /// login credentials, in which case it logs in again.
    pub async fn logout(&self) -> Result<()> {
        let current = self.get_current().await?;
        let id = current
            .id()
            .ok_or_else(|| Error::Client("current account has no self link".to_string()))?;

        self.client.delete(&format!("{LOGIN_URI}/{id}")).await?;
        self.client.invalidate_session().await;
        info!(id, "logged out");
        Ok(())
    }
}

fn account_self_uri(account: &Account) -> Result<&str> {
    account
        .uri()
        .ok_or_else(|| Error::invalid_argument("account has no self link"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uris() {
        assert_eq!(account_uri("17"), "/gdc/account/profile/17");
        assert_eq!(domain_users_uri("acme"), "/gdc/account/domains/acme/users");
    }
}

//! Shared HTTP client
//!
//! Every service goes through one [`RestClient`]: it resolves API URIs
//! against the endpoint, attaches the session token and a request id,
//! retries idempotent requests on transient failures and translates
//! non-success responses into [`RestError`]s.

use gooddata_core::collections::{Page, PageRequest};
use gooddata_core::envelope::{Envelope, Listed, Resource};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{Authenticator, Credentials, TT_HEADER};
use crate::error::{Error, REQUEST_ID_HEADER, RestError, Result};
use crate::settings::{GoodDataEndpoint, GoodDataSettings};

/// Statuses worth retrying: the server may answer differently next time.
const RETRYABLE_STATUSES: [StatusCode; 4] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// HTTP client shared by all services
///
/// Cloning is cheap: clones share the connection pool and session.
#[derive(Debug, Clone)]
pub struct RestClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    base_url: String,
    client: Client,
    settings: GoodDataSettings,
    auth: Authenticator,
}

/// A successful response, fully read
#[derive(Debug, Clone)]
pub struct RawResponse {
    uri: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserialize the body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| Error::Parse {
            uri: self.uri.clone(),
            source,
        })
    }

    /// Deserialize an enveloped resource from the body
    pub fn resource<T: Resource>(&self) -> Result<T> {
        self.json::<Envelope<T>>().map(Envelope::into_inner)
    }
}

impl RestClient {
    /// Create a client for `endpoint`
    ///
    /// No request is made until the first API call; authentication happens
    /// lazily.
    pub fn new(
        endpoint: &GoodDataEndpoint,
        credentials: Credentials,
        settings: GoodDataSettings,
    ) -> Result<Self> {
        settings.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(settings.user_agent_header())
            .default_headers(headers)
            .pool_max_idle_per_host(settings.max_connections);

        if !settings.connection_timeout.is_zero() {
            builder = builder.connect_timeout(settings.connection_timeout);
        }
        if !settings.socket_timeout.is_zero() {
            builder = builder.read_timeout(settings.socket_timeout);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                base_url: endpoint.base_url(),
                client: builder.build()?,
                settings,
                auth: Authenticator::new(credentials),
            }),
        })
    }

    /// Base URL of the API
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn settings(&self) -> &GoodDataSettings {
        &self.inner.settings
    }

    /// Resolve an API URI (usually a bare path) against the endpoint
    pub fn url(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else if uri.starts_with('/') {
            format!("{}{}", self.inner.base_url, uri)
        } else {
            format!("{}/{}", self.inner.base_url, uri)
        }
    }

    /// Whether `url` points at the API endpoint itself (same scheme, host
    /// and port). Only such requests carry the session token.
    fn is_api_url(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.inner.base_url)) {
            (Ok(url), Ok(base)) => url.origin() == base.origin(),
            _ => false,
        }
    }

    // =============================================================================
    // Typed helpers
    // =============================================================================

    /// GET an enveloped resource
    pub async fn get<T: Resource>(&self, uri: &str) -> Result<T> {
        self.execute(Method::GET, uri, &[], None)
            .await?
            .resource()
    }

    /// GET one page of a collection
    pub async fn get_page<T: Listed>(&self, uri: &str, page: &PageRequest) -> Result<Page<T>> {
        let response = match page {
            PageRequest::Uri(next) => self.execute(Method::GET, next, &[], None).await?,
            PageRequest::Offset { .. } => {
                self.execute(Method::GET, uri, &page.query(), None).await?
            }
        };
        response.json()
    }

    /// GET every page of a collection, following `next` links
    pub async fn get_all<T: Listed>(&self, uri: &str) -> Result<Vec<T>> {
        let mut request = PageRequest::default();
        let mut items = Vec::new();

        loop {
            let page: Page<T> = self.get_page(uri, &request).await?;
            let next = page.next_page();
            items.extend(page);

            match next {
                Some(next) => request = next,
                None => break,
            }
        }

        Ok(items)
    }

    pub async fn post<B: Serialize + ?Sized>(&self, uri: &str, body: &B) -> Result<RawResponse> {
        let body = to_json(uri, body)?;
        self.execute(Method::POST, uri, &[], Some(&body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, uri: &str, body: &B) -> Result<RawResponse> {
        let body = to_json(uri, body)?;
        self.execute(Method::PUT, uri, &[], Some(&body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<RawResponse> {
        self.execute(Method::DELETE, uri, &[], None).await
    }

    /// Drop the session tokens
    pub(crate) async fn invalidate_session(&self) {
        self.inner.auth.clear().await;
    }

    // =============================================================================
    // Request execution
    // =============================================================================

    /// Send a request and read the whole response
    ///
    /// Non-success statuses become [`Error::Rest`]. A 401 triggers one token
    /// refresh. Absolute URIs on another host are sent without the session
    /// token. Retryable failures of GET requests are retried according to
    /// [`GoodDataSettings::retry`].
    pub async fn execute(
        &self,
        method: Method,
        uri: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse> {
        let inner = &*self.inner;
        let url = self.url(uri);
        let mut token = if self.is_api_url(&url) {
            Some(inner.auth.token(&inner.client, &inner.base_url).await?)
        } else {
            debug!(uri, "foreign host, sending without session token");
            None
        };
        let mut refreshed = false;
        let mut attempt = 0;

        loop {
            let request_id = Uuid::new_v4().to_string();
            let mut request = inner
                .client
                .request(method.clone(), &url)
                .header(REQUEST_ID_HEADER, &request_id);
            if let Some(token) = &token {
                request = request.header(TT_HEADER, token);
            }
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, uri, request_id, "sending request");

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        if let Some(delay) = self.retry_delay(&method, attempt + 1) {
                            attempt += 1;
                            warn!(
                                %method,
                                uri,
                                attempt,
                                "request failed ({e}), retrying in {delay:?}"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    return Err(e.into());
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !refreshed {
                if let Some(rejected) = &token {
                    warn!(uri, "temporary token rejected, refreshing");
                    let fresh = inner
                        .auth
                        .refresh(&inner.client, &inner.base_url, rejected)
                        .await?;
                    token = Some(fresh);
                    refreshed = true;
                    continue;
                }
            }

            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            if status.is_success() {
                return Ok(RawResponse {
                    uri: uri.to_string(),
                    status,
                    headers,
                    body,
                });
            }

            let error = RestError::from_parts(status, &headers, &body);
            if RETRYABLE_STATUSES.contains(&status) {
                if let Some(delay) = self.retry_delay(&method, attempt + 1) {
                    attempt += 1;
                    warn!(%method, uri, attempt, "request failed ({error}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            debug!(%method, uri, status = status.as_u16(), "request failed");
            return Err(Error::Rest(error));
        }
    }

    /// Delay before retry number `attempt`, or `None` when the request must
    /// not be retried (again)
    fn retry_delay(&self, method: &Method, attempt: u32) -> Option<Duration> {
        let retry = self.inner.settings.retry.as_ref()?;
        (*method == Method::GET && attempt <= retry.retry_count).then(|| retry.delay(attempt))
    }
}

fn to_json<B: Serialize + ?Sized>(uri: &str, body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|source| Error::Parse {
        uri: uri.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(
            &GoodDataEndpoint::parse(base).unwrap(),
            Credentials::sst("SST"),
            GoodDataSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_resolution() {
        let client = client("https://secure.gooddata.com/");
        assert_eq!(client.base_url(), "https://secure.gooddata.com");
        assert_eq!(
            client.url("/gdc/projects"),
            "https://secure.gooddata.com/gdc/projects"
        );
        assert_eq!(
            client.url("gdc/projects"),
            "https://secure.gooddata.com/gdc/projects"
        );
        assert_eq!(
            client.url("http://other.host/gdc"),
            "http://other.host/gdc"
        );
    }

    #[test]
    fn test_session_token_only_for_api_host() {
        let c = client("https://secure.gooddata.com");
        assert!(c.is_api_url("https://secure.gooddata.com/gdc/projects"));
        assert!(c.is_api_url("https://secure.gooddata.com:443/gdc/projects"));
        assert!(!c.is_api_url("http://secure.gooddata.com/gdc/projects"));
        assert!(!c.is_api_url("https://secure.gooddata.com:8443/gdc"));
        assert!(!c.is_api_url("https://secure.gooddata.com.evil.org/gdc"));
        assert!(!c.is_api_url("not a url"));

        let local = client("http://localhost:8080");
        assert!(local.is_api_url(&local.url("/gdc/account/login")));
    }

    #[test]
    fn test_retry_only_for_get() {
        let client = RestClient::new(
            &GoodDataEndpoint::new("secure.gooddata.com"),
            Credentials::sst("SST"),
            GoodDataSettings::default().with_retry(Default::default()),
        )
        .unwrap();

        assert!(client.retry_delay(&Method::GET, 1).is_some());
        assert!(client.retry_delay(&Method::GET, 3).is_some());
        assert!(client.retry_delay(&Method::GET, 4).is_none());
        assert!(client.retry_delay(&Method::POST, 1).is_none());
        assert!(client.retry_delay(&Method::DELETE, 1).is_none());
    }

    #[test]
    fn test_no_retry_without_settings() {
        let client = client("http://localhost:8080");
        assert!(client.retry_delay(&Method::GET, 1).is_none());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = GoodDataSettings {
            max_connections: 0,
            ..Default::default()
        };
        let result = RestClient::new(
            &GoodDataEndpoint::new("secure.gooddata.com"),
            Credentials::sst("SST"),
            settings,
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}

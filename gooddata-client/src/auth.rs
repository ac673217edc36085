//! Authentication
//!
//! GoodData uses two tokens: a long-lived super-secured token (SST) obtained
//! by logging in, and a short-lived temporary token (TT) exchanged for it and
//! sent with every API request. The TT is obtained lazily and refreshed when
//! the API answers 401.

use gooddata_core::dto::auth::{LOGIN_URI, PostUserLogin, TOKEN_URI, UserLogin, UserToken};
use gooddata_core::envelope::Envelope;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Request header carrying the super-secured token
pub const SST_HEADER: &str = "x-gdc-authsst";

/// Request header carrying the temporary token
pub const TT_HEADER: &str = "x-gdc-authtt";

/// How the client authenticates
#[derive(Clone)]
pub enum Credentials {
    /// Log in with a login and password
    LoginPassword { login: String, password: String },
    /// Use an already obtained super-secured token
    Sst(String),
}

impl Credentials {
    pub fn login_password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::LoginPassword {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn sst(token: impl Into<String>) -> Self {
        Self::Sst(token.into())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginPassword { login, .. } => f
                .debug_struct("LoginPassword")
                .field("login", login)
                .finish_non_exhaustive(),
            Self::Sst(_) => f.write_str("Sst(..)"),
        }
    }
}

#[derive(Default)]
struct Tokens {
    sst: Option<String>,
    tt: Option<String>,
}

/// Token cache shared by every service of a client
pub(crate) struct Authenticator {
    credentials: Credentials,
    tokens: Mutex<Tokens>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub(crate) fn new(credentials: Credentials) -> Self {
        let sst = match &credentials {
            Credentials::Sst(token) => Some(token.clone()),
            Credentials::LoginPassword { .. } => None,
        };

        Self {
            credentials,
            tokens: Mutex::new(Tokens { sst, tt: None }),
        }
    }

    /// The current temporary token, obtaining one first if needed
    pub(crate) async fn token(&self, client: &Client, base_url: &str) -> Result<String> {
        let mut tokens = self.tokens.lock().await;
        if let Some(tt) = &tokens.tt {
            return Ok(tt.clone());
        }
        self.obtain(&mut tokens, client, base_url).await
    }

    /// Replace the rejected token `stale` with a fresh one
    ///
    /// When another request already refreshed it, the newer token is returned
    /// without asking the server again.
    pub(crate) async fn refresh(
        &self,
        client: &Client,
        base_url: &str,
        stale: &str,
    ) -> Result<String> {
        let mut tokens = self.tokens.lock().await;
        if let Some(tt) = &tokens.tt {
            if tt != stale {
                return Ok(tt.clone());
            }
        }
        tokens.tt = None;
        self.obtain(&mut tokens, client, base_url).await
    }

    /// Forget all tokens, e.g. after logging out
    pub(crate) async fn clear(&self) {
        let mut tokens = self.tokens.lock().await;
        tokens.tt = None;
        tokens.sst = None;
    }

    async fn obtain(&self, tokens: &mut Tokens, client: &Client, base_url: &str) -> Result<String> {
        let sst = match tokens.sst.clone() {
            Some(sst) => sst,
            None => self.login(client, base_url).await?,
        };

        let tt = match exchange(client, base_url, &sst).await? {
            Some(tt) => tt,
            // An expired SST can be renewed only when we know the password.
            None if matches!(self.credentials, Credentials::LoginPassword { .. }) => {
                debug!("super-secured token rejected, logging in again");
                let sst = self.login(client, base_url).await?;
                exchange(client, base_url, &sst).await?.ok_or_else(|| {
                    Error::Authentication("fresh super-secured token was rejected".to_string())
                })?
            }
            None => {
                return Err(Error::Authentication(
                    "super-secured token was rejected".to_string(),
                ));
            }
        };

        tokens.sst = Some(sst);
        tokens.tt = Some(tt.clone());
        Ok(tt)
    }

    async fn login(&self, client: &Client, base_url: &str) -> Result<String> {
        let Credentials::LoginPassword { login, password } = &self.credentials else {
            return Err(Error::Authentication(
                "no login credentials to obtain a super-secured token".to_string(),
            ));
        };

        let url = format!("{base_url}{LOGIN_URI}");
        let response = client
            .post(&url)
            .json(&Envelope(PostUserLogin::new(login.as_str(), password.as_str())))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "login of {login} rejected with status {status}"
            )));
        }

        let user_login = response
            .json::<Envelope<UserLogin>>()
            .await?
            .into_inner();

        info!(profile = %user_login.profile, "logged in");

        user_login
            .token
            .ok_or_else(|| Error::Authentication("login response carried no token".to_string()))
    }
}

/// Exchange an SST for a TT. `None` means the SST was rejected.
async fn exchange(client: &Client, base_url: &str, sst: &str) -> Result<Option<String>> {
    let url = format!("{base_url}{TOKEN_URI}");
    let response = client.get(&url).header(SST_HEADER, sst).send().await?;

    match response.status() {
        StatusCode::UNAUTHORIZED => Ok(None),
        status if status.is_success() => {
            let token = response.json::<Envelope<UserToken>>().await?.into_inner();
            debug!("obtained temporary token");
            Ok(Some(token.token))
        }
        status => Err(Error::Authentication(format!(
            "token exchange failed with status {status}"
        ))),
    }
}

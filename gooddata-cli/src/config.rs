//! Configuration module
//!
//! Connection details given on the command line or in the environment.

use anyhow::{Context, Result};
use gooddata_client::{Credentials, GoodData, GoodDataEndpoint, GoodDataSettings};

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    /// API host or base URL
    pub host: String,
    pub login: String,
    pub password: String,
}

impl Config {
    /// Where the API lives
    ///
    /// A bare host means HTTPS on the default port.
    pub fn endpoint(&self) -> Result<GoodDataEndpoint> {
        if self.host.contains("://") {
            GoodDataEndpoint::parse(&self.host)
                .with_context(|| format!("Invalid host: {}", self.host))
        } else {
            Ok(GoodDataEndpoint::new(&self.host))
        }
    }

    /// Connect to the API
    ///
    /// Client settings come from `GOODDATA_*` environment variables.
    pub fn connect(&self) -> Result<GoodData> {
        let settings =
            GoodDataSettings::from_env().context("Invalid GOODDATA_* client settings")?;
        let credentials = Credentials::login_password(&self.login, &self.password);
        GoodData::with_endpoint(&self.endpoint()?, credentials, settings)
            .context("Failed to create GoodData client")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

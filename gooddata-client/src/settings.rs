//! Client configuration
//!
//! Connection pool, timeouts, polling and retry behaviour. Settings are read
//! once when the client is built; changing them afterwards has no effect.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default user agent, prefixed by [`GoodDataSettings::user_agent`] when set.
pub const DEFAULT_USER_AGENT: &str = concat!("gooddata-rs/", env!("CARGO_PKG_VERSION"));

/// Client settings
#[derive(Debug, Clone, PartialEq)]
pub struct GoodDataSettings {
    /// Maximum number of idle connections kept in the pool per host
    ///
    /// This does not cap the number of connections open at once.
    pub max_connections: usize,

    /// Time allowed to establish a connection, `Duration::ZERO` for no limit
    pub connection_timeout: Duration,

    /// Maximum inactivity between two reads, `Duration::ZERO` for no limit
    pub socket_timeout: Duration,

    /// Sleep between two polls of an asynchronous task
    pub poll_sleep: Duration,

    /// Prefix for the default user agent
    pub user_agent: Option<String>,

    /// Retry policy for idempotent requests, `None` to never retry
    pub retry: Option<RetrySettings>,
}

impl Default for GoodDataSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            connection_timeout: Duration::from_secs(10),
            socket_timeout: Duration::from_secs(60),
            poll_sleep: Duration::from_secs(5),
            user_agent: None,
            retry: None,
        }
    }
}

impl GoodDataSettings {
    /// Creates settings from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - GOODDATA_MAX_CONNECTIONS (default: 20)
    /// - GOODDATA_CONNECTION_TIMEOUT (seconds, default: 10)
    /// - GOODDATA_SOCKET_TIMEOUT (seconds, default: 60)
    /// - GOODDATA_POLL_SLEEP (seconds, default: 5)
    /// - GOODDATA_USER_AGENT
    /// - GOODDATA_RETRY_COUNT (enables retries with default backoff)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let max_connections = std::env::var("GOODDATA_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_connections);

        let connection_timeout = env_secs("GOODDATA_CONNECTION_TIMEOUT")
            .unwrap_or(defaults.connection_timeout);

        let socket_timeout =
            env_secs("GOODDATA_SOCKET_TIMEOUT").unwrap_or(defaults.socket_timeout);

        let poll_sleep = env_secs("GOODDATA_POLL_SLEEP").unwrap_or(defaults.poll_sleep);

        let user_agent = std::env::var("GOODDATA_USER_AGENT")
            .ok()
            .filter(|s| !s.is_empty());

        let retry = std::env::var("GOODDATA_RETRY_COUNT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .map(|retry_count| RetrySettings {
                retry_count,
                ..RetrySettings::default()
            });

        let settings = Self {
            max_connections,
            connection_timeout,
            socket_timeout,
            poll_sleep,
            user_agent,
            retry,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Sets the sleep between polls
    pub fn with_poll_sleep(mut self, poll_sleep: Duration) -> Self {
        self.poll_sleep = poll_sleep;
        self
    }

    /// Sets the user agent prefix
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enables retries
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = Some(retry);
        self
    }

    /// The full user agent header value
    pub fn user_agent_header(&self) -> String {
        match &self.user_agent {
            Some(prefix) => format!("{prefix} {DEFAULT_USER_AGENT}"),
            None => DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::invalid_argument(
                "max_connections must be greater than zero",
            ));
        }

        if let Some(retry) = &self.retry {
            retry.validate()?;
        }

        Ok(())
    }
}

/// Retry policy with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub retry_count: u32,
    /// Delay before the first retry
    pub retry_initial_interval: Duration,
    /// Upper bound of the delay
    pub retry_max_interval: Duration,
    /// Growth factor of the delay between retries
    pub retry_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_initial_interval: Duration::from_millis(100),
            retry_max_interval: Duration::from_secs(1),
            retry_multiplier: 2.0,
        }
    }
}

impl RetrySettings {
    /// Delay before retry number `attempt` (starting at 1)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self
            .retry_initial_interval
            .mul_f64(self.retry_multiplier.powi(exponent).min(u32::MAX as f64));
        delay.min(self.retry_max_interval)
    }

    /// Validates the policy
    pub fn validate(&self) -> Result<()> {
        if self.retry_count == 0 {
            return Err(Error::invalid_argument(
                "retry_count must be greater than zero",
            ));
        }

        if self.retry_multiplier.is_nan() || self.retry_multiplier < 1.0 {
            return Err(Error::invalid_argument(
                "retry_multiplier must be at least 1",
            ));
        }

        if self.retry_max_interval < self.retry_initial_interval {
            return Err(Error::invalid_argument(
                "retry_max_interval must not be lower than retry_initial_interval",
            ));
        }

        Ok(())
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Where the API lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodDataEndpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl GoodDataEndpoint {
    /// HTTPS on the default port
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            protocol: "https".to_string(),
            host: host.into(),
            port: 443,
        }
    }

    /// Parse a base URL such as `https://secure.gooddata.com` or
    /// `http://localhost:8080`
    pub fn parse(url: &str) -> Result<Self> {
        let (protocol, rest) = url
            .split_once("://")
            .ok_or_else(|| Error::invalid_argument(format!("`{url}` has no protocol")))?;

        let default_port = match protocol {
            "https" => 443,
            "http" => 80,
            other => {
                return Err(Error::invalid_argument(format!(
                    "unsupported protocol `{other}`, expected http or https"
                )));
            }
        };

        let authority = rest.trim_end_matches('/');
        if authority.is_empty() || authority.contains('/') {
            return Err(Error::invalid_argument(format!(
                "`{url}` must be a bare base URL without a path"
            )));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::invalid_argument(format!("invalid port in `{url}`")))?;
                (host, port)
            }
            None => (authority, default_port),
        };

        Ok(Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Base URL, omitting the port when it is the protocol's default
    pub fn base_url(&self) -> String {
        let default_port = match self.protocol.as_str() {
            "https" => 443,
            "http" => 80,
            _ => 0,
        };

        if self.port == default_port {
            format!("{}://{}", self.protocol, self.host)
        } else {
            format!("{}://{}:{}", self.protocol, self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GoodDataSettings::default();
        assert_eq!(settings.max_connections, 20);
        assert_eq!(settings.connection_timeout, Duration::from_secs(10));
        assert_eq!(settings.socket_timeout, Duration::from_secs(60));
        assert_eq!(settings.poll_sleep, Duration::from_secs(5));
        assert!(settings.retry.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = GoodDataSettings::default();
        settings.max_connections = 0;
        assert!(settings.validate().is_err());

        settings.max_connections = 1;
        settings.retry = Some(RetrySettings {
            retry_multiplier: 0.5,
            ..RetrySettings::default()
        });
        assert!(settings.validate().is_err());

        settings.retry = Some(RetrySettings {
            retry_initial_interval: Duration::from_secs(2),
            ..RetrySettings::default()
        });
        assert!(settings.validate().is_err());

        settings.retry = Some(RetrySettings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_user_agent_header() {
        let settings = GoodDataSettings::default();
        assert!(settings.user_agent_header().starts_with("gooddata-rs/"));

        let settings = settings.with_user_agent("my-app/1.0");
        assert!(settings.user_agent_header().starts_with("my-app/1.0 gooddata-rs/"));
    }

    #[test]
    fn test_retry_delay_backoff_is_capped() {
        let retry = RetrySettings::default();
        assert_eq!(retry.delay(1), Duration::from_millis(100));
        assert_eq!(retry.delay(2), Duration::from_millis(200));
        assert_eq!(retry.delay(3), Duration::from_millis(400));
        assert_eq!(retry.delay(10), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_endpoint() {
        let endpoint = GoodDataEndpoint::parse("https://secure.gooddata.com/").unwrap();
        assert_eq!(endpoint, GoodDataEndpoint::new("secure.gooddata.com"));
        assert_eq!(endpoint.base_url(), "https://secure.gooddata.com");

        let endpoint = GoodDataEndpoint::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(endpoint.port, 8080);
        assert_eq!(endpoint.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_parse_endpoint_rejects_bad_urls() {
        assert!(GoodDataEndpoint::parse("secure.gooddata.com").is_err());
        assert!(GoodDataEndpoint::parse("ftp://host").is_err());
        assert!(GoodDataEndpoint::parse("https://host/gdc").is_err());
        assert!(GoodDataEndpoint::parse("https://host:port").is_err());
    }
}

//! Booter configuration
//!
//! Loaded from a JSON file with one section per inventory service:
//!
//! ```json
//! {
//!   "napi":  { "url": "http://10.99.99.10", "username": "admin", "password": "secret" },
//!   "cnapi": { "url": "http://10.99.99.18", "username": "admin", "password": "secret" },
//!   "listen": "0.0.0.0:8080",
//!   "timeout_secs": 30
//! }
//! ```
//!
//! `napi` is the network inventory and `cnapi` the compute inventory. Both
//! sections and all three of their values are required.

use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Section name of the network inventory
pub const NETWORK_SECTION: &str = "napi";

/// Section name of the compute inventory
pub const COMPUTE_SECTION: &str = "cnapi";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default HTTP listen address
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
    8080,
);

/// Connection settings for one inventory service
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
}

impl ServiceConfig {
    /// Create a service config, validating the URL
    pub fn new(
        api: &'static str,
        url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            api,
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            url,
            username: username.into(),
            password: password.into(),
        })
    }

    fn from_raw(api: &'static str, raw: Option<RawServiceConfig>) -> Result<Self> {
        let raw = raw.ok_or(ConfigError::MissingSection(api))?;
        let url = raw.url.ok_or(ConfigError::MissingValue { api, key: "url" })?;
        let username = raw
            .username
            .ok_or(ConfigError::MissingValue { api, key: "username" })?;
        let password = raw
            .password
            .ok_or(ConfigError::MissingValue { api, key: "password" })?;

        Self::new(api, &url, username, password)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawServiceConfig {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    napi: Option<RawServiceConfig>,
    cnapi: Option<RawServiceConfig>,
    listen: Option<SocketAddr>,
    timeout_secs: Option<u64>,
}

/// Validated booter configuration
#[derive(Debug, Clone)]
pub struct BooterConfig {
    /// Network inventory connection
    pub network: ServiceConfig,

    /// Compute inventory connection
    pub compute: ServiceConfig,

    /// Address the HTTP service listens on
    pub listen: SocketAddr,

    /// Per-request timeout for both inventory clients
    pub timeout: Duration,
}

impl BooterConfig {
    /// Create a config with default listen address and timeout
    pub fn new(network: ServiceConfig, compute: ServiceConfig) -> Self {
        Self {
            network,
            compute,
            listen: DEFAULT_LISTEN,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the listen address
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let network = ServiceConfig::from_raw(NETWORK_SECTION, raw.napi)?;
        let compute = ServiceConfig::from_raw(COMPUTE_SECTION, raw.cnapi)?;

        Ok(Self {
            network,
            compute,
            listen: raw.listen.unwrap_or(DEFAULT_LISTEN),
            timeout: raw
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

//! Booter Inventory Clients
//!
//! HTTP clients for the two services boot parameter resolution depends on,
//! and the configuration they are built from.
//!
//! - [`NetworkApiClient`]: network inventory (`napi` config section)
//! - [`ComputeApiClient`]: compute inventory (`cnapi` config section)
//!
//! Both authenticate with HTTP basic auth and apply the configured
//! per-request timeout. Neither retries.
//!
//! # Example
//!
//! ```no_run
//! use booter_inventory::{BooterConfig, InventoryClients};
//!
//! # fn example() -> booter_inventory::Result<()> {
//! let config = BooterConfig::from_file("/opt/smartdc/booter/config.json")?;
//! let clients = InventoryClients::from_config(&config)?;
//! let resolver = clients.resolver();
//! # Ok(())
//! # }
//! ```

pub mod compute;
pub mod config;
pub mod error;
mod http;
pub mod network;

pub use compute::ComputeApiClient;
pub use config::{BooterConfig, ServiceConfig};
pub use error::{ConfigError, Result};
pub use http::USER_AGENT;
pub use network::NetworkApiClient;

use booter_bootparams::BootParamsResolver;
use std::sync::Arc;

/// Both inventory clients, built from one config
#[derive(Debug, Clone)]
pub struct InventoryClients {
    pub network: Arc<NetworkApiClient>,
    pub compute: Arc<ComputeApiClient>,
}

impl InventoryClients {
    /// Build both clients; fails on invalid client settings
    pub fn from_config(config: &BooterConfig) -> Result<Self> {
        Ok(Self {
            network: Arc::new(NetworkApiClient::new(&config.network, config.timeout)?),
            compute: Arc::new(ComputeApiClient::new(&config.compute, config.timeout)?),
        })
    }

    /// Resolver backed by these clients
    pub fn resolver(&self) -> BootParamsResolver {
        BootParamsResolver::new(self.network.clone(), self.compute.clone())
    }
}

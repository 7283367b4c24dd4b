//! Compute inventory client
//!
//! Boot parameters live at `GET /boot/{owner}`, the default profile at
//! `GET /boot/default`. A node the service has no parameters for answers
//! with `{}`.

use async_trait::async_trait;
use booter_bootparams::{BootParameters, ComputeInventory, InventoryResult, LookupKey};
use std::time::Duration;

use crate::config::{ServiceConfig, COMPUTE_SECTION};
use crate::error::Result;
use crate::http::{path_segment, ApiClient};

/// HTTP client for the compute inventory
#[derive(Debug, Clone)]
pub struct ComputeApiClient {
    api: ApiClient,
}

impl ComputeApiClient {
    /// Create a client for the compute inventory
    pub fn new(config: &ServiceConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(COMPUTE_SECTION, config, timeout)?,
        })
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// Path of the boot parameters for a key
    pub fn boot_path(key: &LookupKey) -> InventoryResult<String> {
        Ok(format!("/boot/{}", path_segment(COMPUTE_SECTION, key.as_str())?))
    }
}

#[async_trait]
impl ComputeInventory for ComputeApiClient {
    async fn get_boot_params(&self, key: &LookupKey) -> InventoryResult<BootParameters> {
        let response = self.api.send(self.api.get(&Self::boot_path(key)?)).await?;
        self.api.decode(response).await
    }
}

//! Network inventory client
//!
//! Wire format:
//! - `GET /nics/{mac}` with the colons stripped from the MAC, percent-encoded
//! - `POST /networks/admin/nics` to provision an admin NIC
//! - `GET /nics?belongs_to_uuid={owner}` to list an owner's NICs

use async_trait::async_trait;
use booter_bootparams::{InventoryResult, NetworkInventory, NewNic, Nic};
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::{ServiceConfig, NETWORK_SECTION};
use crate::error::Result;
use crate::http::{path_segment, ApiClient};

/// Network the admin NICs are provisioned on
pub const ADMIN_NETWORK: &str = "admin";

/// MAC address in the form the service keys NICs by
pub fn mac_path(mac: &str) -> String {
    mac.replace(':', "").to_ascii_lowercase()
}

/// HTTP client for the network inventory
#[derive(Debug, Clone)]
pub struct NetworkApiClient {
    api: ApiClient,
}

impl NetworkApiClient {
    /// Create a client for the network inventory
    pub fn new(config: &ServiceConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(NETWORK_SECTION, config, timeout)?,
        })
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl NetworkInventory for NetworkApiClient {
    async fn get_nic(&self, mac: &str) -> InventoryResult<Option<Nic>> {
        let path = format!("/nics/{}", path_segment(NETWORK_SECTION, &mac_path(mac))?);
        let response = self.api.send(self.api.get(&path)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.api.decode(response).await.map(Some)
    }

    async fn provision_nic(&self, nic: &NewNic) -> InventoryResult<Nic> {
        let path = format!("/networks/{}/nics", ADMIN_NETWORK);
        let response = self.api.send(self.api.post(&path).json(nic)).await?;
        self.api.decode(response).await
    }

    async fn list_nics(&self, owner: &str) -> InventoryResult<Vec<Nic>> {
        let request = self.api.get("/nics").query(&[("belongs_to_uuid", owner)]);
        let response = self.api.send(request).await?;
        self.api.decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_path() {
        assert_eq!(mac_path("00:1a:2b:3c:4d:5e"), "001a2b3c4d5e");
        assert_eq!(mac_path("00:1A:2B:3C:4D:5E"), "001a2b3c4d5e");
        assert_eq!(mac_path("001a2b3c4d5e"), "001a2b3c4d5e");
    }


    #[test]
    fn test_client_creation() {
        let config = ServiceConfig::new("napi", "http://10.99.99.10", "admin", "secret").unwrap();
        let client = NetworkApiClient::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://10.99.99.10");
    }
}

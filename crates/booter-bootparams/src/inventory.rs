//! Inventory service traits
//!
//! The resolver talks to two services: the network inventory (NICs, their
//! owners and tags) and the compute inventory (boot parameters). HTTP
//! clients live in `booter-inventory`; in-memory versions are in
//! [`crate::memory`].

use async_trait::async_trait;

use crate::error::InventoryError;
use crate::types::{BootParameters, LookupKey, NewNic, Nic};

/// Result type for inventory calls
pub type InventoryResult<T> = std::result::Result<T, InventoryError>;

/// Network inventory: NIC records keyed by MAC
#[async_trait]
pub trait NetworkInventory: Send + Sync {
    /// Get the NIC with this MAC, `None` if the inventory has no such NIC
    async fn get_nic(&self, mac: &str) -> InventoryResult<Option<Nic>>;

    /// Create a NIC record
    async fn provision_nic(&self, nic: &NewNic) -> InventoryResult<Nic>;

    /// List all NICs belonging to an owner
    async fn list_nics(&self, owner: &str) -> InventoryResult<Vec<Nic>>;
}

/// Compute inventory: per-node and default boot parameters
#[async_trait]
pub trait ComputeInventory: Send + Sync {
    /// Get boot parameters; an empty object means none are configured
    async fn get_boot_params(&self, key: &LookupKey) -> InventoryResult<BootParameters>;
}

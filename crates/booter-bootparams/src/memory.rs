//! In-memory inventories
//!
//! Every call is recorded so tests can assert exactly which requests a
//! resolution made.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use crate::error::InventoryError;
use crate::inventory::{ComputeInventory, InventoryResult, NetworkInventory};
use crate::types::{BootParameters, LookupKey, NewNic, Nic};

/// A recorded network inventory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCall {
    GetNic(String),
    ProvisionNic(NewNic),
    ListNics(String),
}

/// Network inventory operations, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkOp {
    GetNic,
    ProvisionNic,
    ListNics,
}

fn injected(service: &'static str) -> InventoryError {
    InventoryError::Api {
        service,
        status: 500,
        message: "injected failure".to_string(),
    }
}

/// In-memory network inventory
#[derive(Debug, Default)]
pub struct MemoryNetworkInventory {
    nics: RwLock<Vec<Nic>>,
    calls: Mutex<Vec<NetworkCall>>,
    failing: RwLock<HashSet<NetworkOp>>,
}

impl MemoryNetworkInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a NIC record
    pub fn with_nic(self, nic: Nic) -> Self {
        self.nics.write().unwrap_or_else(|e| e.into_inner()).push(nic);
        self
    }

    /// Make an operation fail with a 500
    pub fn fail_on(self, op: NetworkOp) -> Self {
        self.failing.write().unwrap_or_else(|e| e.into_inner()).insert(op);
        self
    }

    /// All NIC records, including provisioned ones
    pub fn nics(&self) -> Vec<Nic> {
        self.nics.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<NetworkCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Provisioning requests made so far
    pub fn provisioned(&self) -> Vec<NewNic> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NetworkCall::ProvisionNic(nic) => Some(nic),
                _ => None,
            })
            .collect()
    }

    /// Owners whose NICs were listed
    pub fn listed_owners(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NetworkCall::ListNics(owner) => Some(owner),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: NetworkCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    fn check(&self, op: NetworkOp) -> InventoryResult<()> {
        if self.failing.read().unwrap_or_else(|e| e.into_inner()).contains(&op) {
            return Err(injected("napi"));
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkInventory for MemoryNetworkInventory {
    async fn get_nic(&self, mac: &str) -> InventoryResult<Option<Nic>> {
        self.record(NetworkCall::GetNic(mac.to_string()));
        self.check(NetworkOp::GetNic)?;

        let nics = self.nics.read().unwrap_or_else(|e| e.into_inner());
        Ok(nics
            .iter()
            .find(|nic| {
                nic.mac
                    .as_deref()
                    .map(|m| m.eq_ignore_ascii_case(mac))
                    .unwrap_or(false)
            })
            .cloned())
    }

    async fn provision_nic(&self, nic: &NewNic) -> InventoryResult<Nic> {
        self.record(NetworkCall::ProvisionNic(nic.clone()));
        self.check(NetworkOp::ProvisionNic)?;

        let created = nic.to_nic();
        self.nics
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(created.clone());
        Ok(created)
    }

    async fn list_nics(&self, owner: &str) -> InventoryResult<Vec<Nic>> {
        self.record(NetworkCall::ListNics(owner.to_string()));
        self.check(NetworkOp::ListNics)?;

        let nics = self.nics.read().unwrap_or_else(|e| e.into_inner());
        Ok(nics.iter().filter(|nic| nic.owner_id == owner).cloned().collect())
    }
}

/// In-memory compute inventory
///
/// Unknown keys answer with an empty object, like the real service does
/// for a node it has no parameters for.
#[derive(Debug, Default)]
pub struct MemoryComputeInventory {
    params: RwLock<HashMap<String, BootParameters>>,
    calls: Mutex<Vec<String>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryComputeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parameters for an owner id, or "default"
    pub fn with_params(self, key: impl Into<String>, params: BootParameters) -> Self {
        self.params
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), params);
        self
    }

    /// Make lookups of a key fail with a 500
    pub fn fail_on(self, key: impl Into<String>) -> Self {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into());
        self
    }

    /// Keys looked up so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of lookups for a key
    pub fn lookups_of(&self, key: &str) -> usize {
        self.calls().iter().filter(|k| k.as_str() == key).count()
    }
}

#[async_trait]
impl ComputeInventory for MemoryComputeInventory {
    async fn get_boot_params(&self, key: &LookupKey) -> InventoryResult<BootParameters> {
        let key = key.as_str();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());

        if self.failing.read().unwrap_or_else(|e| e.into_inner()).contains(key) {
            return Err(injected("cnapi"));
        }

        Ok(self
            .params
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

//! Boot parameter resolver
//!
//! Resolves the boot parameters for a MAC in five sequential stages:
//!
//! 1. Look up the NIC in the network inventory
//! 2. Provision an admin NIC if there is none
//! 3. Look up node-specific boot parameters for the NIC's owner
//! 4. Fall back to the default profile (admin owner or empty result)
//! 5. List the owner's other NICs for their tags
//!
//! The results are then merged (see [`crate::merge`]). Each stage takes the
//! previous stage's output; any inventory failure aborts the resolution.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{BootParamsError, Result};
use crate::inventory::{ComputeInventory, NetworkInventory};
use crate::merge::{merge_nic_tags, OverriddenKeys};
use crate::types::{BootParameters, LookupKey, NewNic, Nic, Owner};

/// NIC that owns the requested MAC
#[derive(Debug, Clone)]
pub struct BootNic {
    pub nic: Nic,
    /// Created by this resolution
    pub provisioned: bool,
}

/// Boot parameters as returned by the compute inventory
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    /// Key the parameters were finally fetched with
    pub key: LookupKey,
    pub params: BootParameters,
    /// Node-specific lookup came back empty and the default was used
    pub fell_back: bool,
}

/// Everything a single resolution gathered before the merge
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// MAC the resolution was requested for
    pub mac: String,
    pub boot: BootNic,
    pub owner: Owner,
    pub resolved: ResolvedParams,
    /// Boot NIC first, then the owner's NICs in enumeration order
    pub nics: Vec<Nic>,
}

impl ResolutionContext {
    /// MAC bound to the admin interface
    pub fn boot_mac(&self) -> &str {
        self.boot.nic.mac.as_deref().unwrap_or(&self.mac)
    }

    /// Merge NIC data into the boot parameters
    pub fn merge(self) -> Resolution {
        let boot_mac = self.boot_mac().to_string();
        let mut params = self.resolved.params;
        let overridden = merge_nic_tags(&boot_mac, &self.boot.nic, &self.nics, &mut params);

        Resolution {
            params,
            provisioned: self.boot.provisioned,
            lookup_key: self.resolved.key,
            fell_back: self.resolved.fell_back,
            overridden,
        }
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Merged boot parameters
    pub params: BootParameters,
    /// An admin NIC was provisioned for the MAC
    pub provisioned: bool,
    /// Key the boot parameters came from
    pub lookup_key: LookupKey,
    /// Node-specific parameters were empty, default profile used
    pub fell_back: bool,
    /// Kernel arguments that kept their value over a NIC binding
    pub overridden: OverriddenKeys,
}

/// Resolves boot parameters for network-booting nodes
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct BootParamsResolver {
    network: Arc<dyn NetworkInventory>,
    compute: Arc<dyn ComputeInventory>,
}

impl BootParamsResolver {
    /// Create a resolver over the two inventories
    pub fn new(network: Arc<dyn NetworkInventory>, compute: Arc<dyn ComputeInventory>) -> Self {
        Self { network, compute }
    }

    /// Resolve the boot parameters for a MAC
    pub async fn resolve_boot_parameters(&self, mac: &str) -> Result<BootParameters> {
        Ok(self.resolve(mac).await?.params)
    }

    /// Resolve the boot parameters for a MAC, with diagnostics
    pub async fn resolve(&self, mac: &str) -> Result<Resolution> {
        let context = self.gather(mac).await?;
        let resolution = context.merge();

        if !resolution.overridden.is_empty() {
            let keys = resolution.overridden.to_vec();
            warn!(mac = %mac, overridden = ?keys, "kernel_args: overriding nic tag values");
        }

        info!(
            mac = %mac,
            key = %resolution.lookup_key,
            params = ?resolution.params,
            "Boot params generated"
        );
        Ok(resolution)
    }

    /// Run the lookup stages and collect their results
    pub async fn gather(&self, mac: &str) -> Result<ResolutionContext> {
        let found = self.lookup_nic(mac).await?;
        let boot = match found {
            Some(nic) => BootNic {
                nic,
                provisioned: false,
            },
            None => BootNic {
                nic: self.provision_admin_nic(mac).await?,
                provisioned: true,
            },
        };

        let owner = Owner::of(&boot.nic);
        let resolved = self.lookup_boot_params(&owner).await?;
        let nics = self.collect_nics(&boot.nic, &owner).await?;

        Ok(ResolutionContext {
            mac: mac.to_string(),
            boot,
            owner,
            resolved,
            nics,
        })
    }

    /// Stage 1: find the NIC for a MAC
    async fn lookup_nic(&self, mac: &str) -> Result<Option<Nic>> {
        match self.network.get_nic(mac).await {
            Ok(Some(nic)) => {
                debug!(mac = %mac, nic = ?nic, "Got nic from network inventory");
                Ok(Some(nic))
            }
            Ok(None) => {
                debug!(mac = %mac, "Did not find nic in network inventory");
                Ok(None)
            }
            Err(e) => {
                error!(mac = %mac, error = %e, "Error getting nic from network inventory");
                Err(BootParamsError::NicLookup {
                    mac: mac.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Stage 2: create an admin NIC for an unknown MAC
    async fn provision_admin_nic(&self, mac: &str) -> Result<Nic> {
        let request = NewNic::admin(mac);
        match self.network.provision_nic(&request).await {
            Ok(nic) => {
                debug!(mac = %mac, nic = ?nic, "Got provisioned nic from network inventory");
                Ok(nic)
            }
            Err(e) => {
                error!(mac = %mac, error = %e, "Error provisioning admin nic");
                Err(BootParamsError::NicProvision {
                    mac: mac.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Stages 3 and 4: node-specific parameters, falling back to the default
    async fn lookup_boot_params(&self, owner: &Owner) -> Result<ResolvedParams> {
        let key = LookupKey::for_owner(owner);
        if key.is_default() {
            let params = self.fetch_params(&key).await?;
            return Ok(ResolvedParams {
                key,
                params,
                fell_back: false,
            });
        }

        let params = self.fetch_params(&key).await?;
        if !params.is_empty() {
            return Ok(ResolvedParams {
                key,
                params,
                fell_back: false,
            });
        }

        warn!(owner = %owner, "empty bootparams: getting default bootparams instead");
        let key = LookupKey::Default;
        let params = self.fetch_params(&key).await?;
        Ok(ResolvedParams {
            key,
            params,
            fell_back: true,
        })
    }

    async fn fetch_params(&self, key: &LookupKey) -> Result<BootParameters> {
        match self.compute.get_boot_params(key).await {
            Ok(params) => {
                debug!(key = %key, params = ?params, "Got bootparams from compute inventory");
                Ok(params)
            }
            Err(e) => {
                error!(key = %key, error = %e, "Error getting bootparams from compute inventory");
                Err(BootParamsError::BootParamsLookup {
                    key: key.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Stage 5: the boot NIC followed by every NIC of a concrete owner
    async fn collect_nics(&self, boot_nic: &Nic, owner: &Owner) -> Result<Vec<Nic>> {
        let mut nics = vec![boot_nic.clone()];
        let Owner::Entity(id) = owner else {
            return Ok(nics);
        };

        match self.network.list_nics(id).await {
            Ok(siblings) => {
                debug!(owner = %id, count = siblings.len(), "Got nics from network inventory");
                nics.extend(siblings);
                Ok(nics)
            }
            Err(e) => {
                error!(owner = %id, error = %e, "Error getting nics from network inventory");
                Err(BootParamsError::NicEnumeration {
                    owner: id.clone(),
                    source: e,
                })
            }
        }
    }
}

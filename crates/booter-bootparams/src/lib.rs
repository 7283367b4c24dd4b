//! Booter Boot Parameters
//!
//! This crate resolves the network-boot configuration for a compute node,
//! identified by the MAC address it PXE boots from.
//!
//! # Overview
//!
//! Resolution queries two services:
//!
//! - **Network inventory**: NIC records, their owners and provided tags
//! - **Compute inventory**: per-node and default boot parameters
//!
//! ```text
//! MAC ──► NIC lookup ──► (provision admin NIC) ──► boot params lookup
//!                                                     │
//!                              (default profile) ◄────┤
//!                                                     ▼
//!                       merge ◄── owner's NICs (tags → <tag>_nic)
//! ```
//!
//! Kernel arguments set in the compute inventory always take precedence
//! over NIC tag bindings; collisions are logged as overrides.
//!
//! # Example
//!
//! ```
//! use booter_bootparams::{
//!     BootParameters, BootParamsResolver, MemoryComputeInventory, MemoryNetworkInventory,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> booter_bootparams::Result<()> {
//! let network = Arc::new(MemoryNetworkInventory::new());
//! let compute = Arc::new(
//!     MemoryComputeInventory::new()
//!         .with_params("default", BootParameters::with_kernel_args([("rabbitmq", "guest")])),
//! );
//!
//! let resolver = BootParamsResolver::new(network, compute);
//! let params = resolver.resolve_boot_parameters("00:0c:29:aa:bb:cc").await?;
//!
//! assert_eq!(params.kernel_arg("admin_nic"), Some("00:0c:29:aa:bb:cc"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod inventory;
pub mod memory;
pub mod merge;
pub mod resolver;
pub mod types;

pub use error::{BootParamsError, InventoryError, Result, Stage};
pub use inventory::{ComputeInventory, InventoryResult, NetworkInventory};
pub use memory::{MemoryComputeInventory, MemoryNetworkInventory};
pub use merge::{merge_nic_tags, OverriddenKeys, SeenMacs};
pub use resolver::{BootNic, BootParamsResolver, Resolution, ResolutionContext, ResolvedParams};
pub use types::{
    BootParameters, KernelArgs, LookupKey, NewNic, Nic, Owner, OwnerKind, ADMIN_NIC_KEY,
    ADMIN_OWNER, ADMIN_TAG,
};

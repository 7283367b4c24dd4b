//! Error types for boot parameter resolution
//!
//! Inventory failures are wrapped with the pipeline stage that hit them;
//! the inventory error itself is kept unchanged as the source.

use std::fmt;
use thiserror::Error;

/// Error returned by an inventory service
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Service answered with a non-success status
    #[error("{service} returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Request never got an answer (connect, timeout, TLS)
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Value cannot be sent as a single URL path segment
    #[error("invalid {service} path segment '{value}'")]
    InvalidSegment {
        service: &'static str,
        value: String,
    },
}

impl InventoryError {
    /// HTTP status reported by the service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            InventoryError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pipeline stage a resolution failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NicLookup,
    NicProvision,
    BootParamsLookup,
    NicEnumeration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::NicLookup => "nic-lookup",
            Stage::NicProvision => "nic-provision",
            Stage::BootParamsLookup => "bootparams-lookup",
            Stage::NicEnumeration => "nic-enumeration",
        };
        f.write_str(name)
    }
}

/// Error type for boot parameter resolution
#[derive(Debug, Error)]
pub enum BootParamsError {
    /// Looking up the NIC for the requested MAC failed
    #[error("error getting nic {mac}: {source}")]
    NicLookup {
        mac: String,
        #[source]
        source: InventoryError,
    },

    /// Provisioning an admin NIC failed
    #[error("error provisioning admin nic {mac}: {source}")]
    NicProvision {
        mac: String,
        #[source]
        source: InventoryError,
    },

    /// Fetching node-specific or default boot parameters failed
    #[error("error getting {key} boot parameters: {source}")]
    BootParamsLookup {
        key: String,
        #[source]
        source: InventoryError,
    },

    /// Listing the owner's NICs failed
    #[error("error getting nics for {owner}: {source}")]
    NicEnumeration {
        owner: String,
        #[source]
        source: InventoryError,
    },
}

impl BootParamsError {
    /// Stage that failed
    pub fn stage(&self) -> Stage {
        match self {
            BootParamsError::NicLookup { .. } => Stage::NicLookup,
            BootParamsError::NicProvision { .. } => Stage::NicProvision,
            BootParamsError::BootParamsLookup { .. } => Stage::BootParamsLookup,
            BootParamsError::NicEnumeration { .. } => Stage::NicEnumeration,
        }
    }

    /// The underlying inventory error
    pub fn inventory_error(&self) -> &InventoryError {
        match self {
            BootParamsError::NicLookup { source, .. }
            | BootParamsError::NicProvision { source, .. }
            | BootParamsError::BootParamsLookup { source, .. }
            | BootParamsError::NicEnumeration { source, .. } => source,
        }
    }
}

/// Result type for boot parameter resolution
pub type Result<T> = std::result::Result<T, BootParamsError>;

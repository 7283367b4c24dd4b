//! Boot parameter types
//!
//! Network-inventory NIC records and the boot parameters handed to a node
//! at network-boot time. Field names follow the inventory wire format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Owner identifier reserved for host-level (admin) interfaces
pub const ADMIN_OWNER: &str = "00000000-0000-0000-0000-000000000000";

/// Tag provided by auto-provisioned admin NICs
pub const ADMIN_TAG: &str = "admin";

/// Kernel argument naming the boot (admin) interface
pub const ADMIN_NIC_KEY: &str = "admin_nic";

/// Kernel argument mapping, sorted by key
pub type KernelArgs = BTreeMap<String, String>;

/// Kind of entity a NIC belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// A compute node
    Machine,
    /// Anything else, including the admin sentinel
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Machine => write!(f, "machine"),
            OwnerKind::Other => write!(f, "other"),
        }
    }
}

/// NIC record as tracked by the network inventory
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Nic {
    /// Hardware address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,

    /// Entity this NIC belongs to
    #[serde(rename = "belongs_to_uuid", default)]
    pub owner_id: String,

    /// Kind of the owning entity
    #[serde(rename = "belongs_to_type", default)]
    pub owner_kind: OwnerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,

    /// Capability tags this NIC provides (e.g. "admin", "external")
    #[serde(rename = "nic_tags_provided", default, skip_serializing_if = "Option::is_none")]
    pub tags_provided: Option<Vec<String>>,
}

impl Nic {
    /// Create a NIC owned by the given entity
    pub fn new(mac: impl Into<String>, owner_id: impl Into<String>, owner_kind: OwnerKind) -> Self {
        Self {
            mac: Some(mac.into()),
            owner_id: owner_id.into(),
            owner_kind,
            ..Default::default()
        }
    }

    /// Set IP address and netmask
    pub fn with_address(mut self, ip: impl Into<String>, netmask: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self.netmask = Some(netmask.into());
        self
    }

    /// Add a provided tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags_provided.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Whether this NIC is owned by the admin sentinel
    pub fn is_admin_owned(&self) -> bool {
        self.owner_id == ADMIN_OWNER
    }
}

/// Request body for auto-provisioning an admin NIC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNic {
    pub owner_uuid: String,
    pub belongs_to_uuid: String,
    pub belongs_to_type: OwnerKind,
    pub mac: String,
    pub nic_tags_provided: Vec<String>,
}

impl NewNic {
    /// Admin NIC for a MAC the network inventory has never seen
    pub fn admin(mac: impl Into<String>) -> Self {
        Self {
            owner_uuid: ADMIN_OWNER.to_string(),
            belongs_to_uuid: ADMIN_OWNER.to_string(),
            belongs_to_type: OwnerKind::Other,
            mac: mac.into(),
            nic_tags_provided: vec![ADMIN_TAG.to_string()],
        }
    }

    /// The NIC record this request creates
    pub fn to_nic(&self) -> Nic {
        Nic {
            mac: Some(self.mac.clone()),
            owner_id: self.belongs_to_uuid.clone(),
            owner_kind: self.belongs_to_type,
            ip: None,
            netmask: None,
            tags_provided: Some(self.nic_tags_provided.clone()),
        }
    }
}

/// Owner of the boot NIC, as far as resolution is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Host-level admin interface, no node-specific data
    Admin,
    /// A concrete entity (usually a compute node)
    Entity(String),
}

impl Owner {
    /// Classify the owner of a NIC
    pub fn of(nic: &Nic) -> Self {
        if nic.is_admin_owned() {
            Owner::Admin
        } else {
            Owner::Entity(nic.owner_id.clone())
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Admin => write!(f, "{}", ADMIN_OWNER),
            Owner::Entity(id) => write!(f, "{}", id),
        }
    }
}

/// Key used to look up boot parameters in the compute inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// The default boot profile
    Default,
    /// Node-specific parameters
    Owner(String),
}

impl LookupKey {
    /// Initial lookup key for an owner
    pub fn for_owner(owner: &Owner) -> Self {
        match owner {
            Owner::Admin => LookupKey::Default,
            Owner::Entity(id) => LookupKey::Owner(id.clone()),
        }
    }

    /// Path segment for the compute inventory
    pub fn as_str(&self) -> &str {
        match self {
            LookupKey::Default => "default",
            LookupKey::Owner(id) => id,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, LookupKey::Default)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boot parameters returned by the compute inventory
///
/// Fields other than `kernel_args`, `ip` and `netmask` are carried through
/// untouched. Serialization is key-sorted, so identical inputs always
/// produce identical bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BootParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_args: Option<KernelArgs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,

    /// Any other fields (kernel, platform, boot modules, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BootParameters {
    /// Parameters with the given kernel arguments
    pub fn with_kernel_args<I, K, V>(args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kernel_args: Some(args.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            ..Default::default()
        }
    }

    /// Add an additional field
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True when the inventory knows no parameters for a node
    ///
    /// That is `{}`, or an object whose only content is an empty or null
    /// `kernel_args`. Any other field makes the answer real.
    pub fn is_empty(&self) -> bool {
        self.kernel_args.as_ref().map_or(true, KernelArgs::is_empty)
            && self.ip.is_none()
            && self.netmask.is_none()
            && self.extra.is_empty()
    }

    /// Kernel arguments, created empty if absent
    pub fn kernel_args_mut(&mut self) -> &mut KernelArgs {
        self.kernel_args.get_or_insert_with(KernelArgs::new)
    }

    /// Look up a single kernel argument
    pub fn kernel_arg(&self, key: &str) -> Option<&str> {
        self.kernel_args
            .as_ref()
            .and_then(|args| args.get(key))
            .map(String::as_str)
    }
}

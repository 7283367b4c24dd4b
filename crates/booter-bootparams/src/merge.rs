//! NIC tag merge
//!
//! Injects the boot NIC's address and every discovered `<tag>_nic` binding
//! into the kernel arguments. Kernel arguments that came from the compute
//! inventory always win; a collision is recorded as an override instead.
//! Among NICs, the first one in list order to claim a tag keeps it.

use std::collections::{BTreeSet, HashSet};

use crate::types::{BootParameters, Nic, ADMIN_NIC_KEY};

/// Suffix appended to a NIC tag to form its kernel argument
pub const NIC_KEY_SUFFIX: &str = "_nic";

/// Kernel argument key for a NIC tag
pub fn tag_key(tag: &str) -> String {
    format!("{}{}", tag, NIC_KEY_SUFFIX)
}

/// MACs whose tags have already been bound
#[derive(Debug, Clone, Default)]
pub struct SeenMacs(HashSet<String>);

impl SeenMacs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a MAC as seen, returns false if it already was
    pub fn insert(&mut self, mac: &str) -> bool {
        self.0.insert(mac.to_string())
    }

    pub fn contains(&self, mac: &str) -> bool {
        self.0.contains(mac)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Kernel argument keys whose existing value was kept over a NIC binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverriddenKeys(BTreeSet<String>);

impl OverriddenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>) {
        self.0.insert(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Merge NIC data into boot parameters
///
/// `boot_mac` is the boot NIC's MAC and `nics` the boot NIC followed by its
/// siblings in enumeration order. Returns the overridden keys; the caller
/// decides how to report them.
pub fn merge_nic_tags(
    boot_mac: &str,
    boot_nic: &Nic,
    nics: &[Nic],
    params: &mut BootParameters,
) -> OverriddenKeys {
    params.ip = boot_nic.ip.clone();
    params.netmask = boot_nic.netmask.clone();

    let mut overridden = OverriddenKeys::new();
    let mut seen = SeenMacs::new();
    let kernel_args = params.kernel_args_mut();

    if kernel_args.contains_key(ADMIN_NIC_KEY) {
        overridden.insert(ADMIN_NIC_KEY);
    } else {
        kernel_args.insert(ADMIN_NIC_KEY.to_string(), boot_mac.to_string());
        seen.insert(boot_mac);
    }

    for nic in nics {
        let (Some(mac), Some(tags)) = (nic.mac.as_deref(), nic.tags_provided.as_ref()) else {
            continue;
        };
        if seen.contains(mac) {
            continue;
        }

        for tag in tags {
            let key = tag_key(tag);
            if kernel_args.contains_key(&key) {
                overridden.insert(key);
            } else {
                kernel_args.insert(key, mac.to_string());
            }
        }
        seen.insert(mac);
    }

    overridden
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OwnerKind, ADMIN_OWNER};

    const NODE: &str = "af2f2e34-5f59-4b4a-9a8b-e0b1b4a30c1e";

    fn boot_nic() -> Nic {
        Nic::new("00:1a:2b:3c:4d:5e", NODE, OwnerKind::Machine)
            .with_address("10.99.99.7", "255.255.255.0")
            .with_tag("admin")
    }

    #[test]
    fn test_admin_binding_and_address() {
        let nic = boot_nic();
        let mut params = BootParameters::with_kernel_args([("rabbitmq", "guest")]);

        let overridden = merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone()], &mut params);

        assert!(overridden.is_empty());
        assert_eq!(params.ip.as_deref(), Some("10.99.99.7"));
        assert_eq!(params.netmask.as_deref(), Some("255.255.255.0"));
        assert_eq!(params.kernel_arg("admin_nic"), Some("00:1a:2b:3c:4d:5e"));
        assert_eq!(params.kernel_arg("rabbitmq"), Some("guest"));
        // Boot NIC was marked seen by the admin binding, its tags are not re-bound
        assert_eq!(params.kernel_args.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_existing_admin_nic_is_kept() {
        let nic = boot_nic();
        let mut params = BootParameters::with_kernel_args([("admin_nic", "aa:aa:aa:aa:aa:aa")]);

        let overridden = merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone()], &mut params);

        assert_eq!(params.kernel_arg("admin_nic"), Some("aa:aa:aa:aa:aa:aa"));
        assert!(overridden.contains("admin_nic"));
        assert_eq!(overridden.len(), 1);
    }

    #[test]
    fn test_existing_tag_key_is_kept() {
        let nic = boot_nic();
        let storage = Nic::new("00:1a:2b:3c:4d:60", NODE, OwnerKind::Machine).with_tag("storage");
        let mut params = BootParameters::with_kernel_args([("storage_nic", "operator-choice")]);

        let overridden =
            merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone(), storage], &mut params);

        assert_eq!(params.kernel_arg("storage_nic"), Some("operator-choice"));
        assert_eq!(overridden.to_vec(), vec!["storage_nic".to_string()]);
    }

    #[test]
    fn test_first_nic_wins_tag() {
        let nic = boot_nic();
        let first = Nic::new("00:1a:2b:3c:4d:61", NODE, OwnerKind::Machine)
            .with_tag("external")
            .with_tag("internal");
        let second = Nic::new("00:1a:2b:3c:4d:62", NODE, OwnerKind::Machine).with_tag("external");
        let mut params = BootParameters::with_kernel_args(Vec::<(String, String)>::new());

        let overridden =
            merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone(), first, second], &mut params);

        assert_eq!(params.kernel_arg("external_nic"), Some("00:1a:2b:3c:4d:61"));
        assert_eq!(params.kernel_arg("internal_nic"), Some("00:1a:2b:3c:4d:61"));
        assert!(overridden.contains("external_nic"));
    }

    #[test]
    fn test_duplicate_macs_are_skipped() {
        let nic = boot_nic();
        let sibling = Nic::new("00:1a:2b:3c:4d:61", NODE, OwnerKind::Machine).with_tag("external");
        let mut params = BootParameters::default();

        // Enumeration returns the boot NIC and the sibling again
        let nics = vec![nic.clone(), sibling.clone(), nic.clone(), sibling];
        let overridden = merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &nics, &mut params);

        assert!(overridden.is_empty());
        assert_eq!(params.kernel_arg("external_nic"), Some("00:1a:2b:3c:4d:61"));
    }

    #[test]
    fn test_boot_nic_tags_bound_when_admin_overridden() {
        let nic = boot_nic().with_tag("manta");
        let mut params = BootParameters::with_kernel_args([("admin_nic", "aa:aa:aa:aa:aa:aa")]);

        let overridden = merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone()], &mut params);

        // Not marked seen by the admin binding, so its own tags get processed
        assert_eq!(params.kernel_arg("manta_nic"), Some("00:1a:2b:3c:4d:5e"));
        assert_eq!(params.kernel_arg("admin_nic"), Some("aa:aa:aa:aa:aa:aa"));
        assert_eq!(overridden.to_vec(), vec!["admin_nic".to_string()]);
    }

    #[test]
    fn test_partial_nics_are_skipped() {
        let nic = boot_nic();
        let no_mac = Nic {
            tags_provided: Some(vec!["external".to_string()]),
            ..Default::default()
        };
        let no_tags = Nic::new("00:1a:2b:3c:4d:63", NODE, OwnerKind::Machine);
        let mut params = BootParameters::default();

        merge_nic_tags("00:1a:2b:3c:4d:5e", &nic, &[nic.clone(), no_mac, no_tags], &mut params);

        assert_eq!(params.kernel_args.as_ref().unwrap().len(), 1);
        assert!(params.kernel_arg("external_nic").is_none());
    }

    #[test]
    fn test_address_is_overwritten() {
        let nic = Nic::new("00:0c:29:aa:bb:cc", ADMIN_OWNER, OwnerKind::Other).with_tag("admin");
        let mut params = BootParameters {
            ip: Some("192.0.2.1".to_string()),
            netmask: Some("255.0.0.0".to_string()),
            ..Default::default()
        };

        merge_nic_tags("00:0c:29:aa:bb:cc", &nic, &[nic.clone()], &mut params);

        assert!(params.ip.is_none());
        assert!(params.netmask.is_none());
    }

    #[test]
    fn test_tag_key() {
        assert_eq!(tag_key("storage"), "storage_nic");
        assert_eq!(tag_key("nic_tag_x"), "nic_tag_x_nic");
    }

    #[test]
    fn test_seen_macs() {
        let mut seen = SeenMacs::new();
        assert!(seen.is_empty());
        assert!(seen.insert("00:1a:2b:3c:4d:5e"));
        assert!(!seen.insert("00:1a:2b:3c:4d:5e"));
        assert!(seen.contains("00:1a:2b:3c:4d:5e"));
        assert_eq!(seen.len(), 1);
    }
}

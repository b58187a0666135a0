use anyhow::Result;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::str::FromStr;

use super::service::require_service;
use super::{base_entry, find_entries, CONTAINER_KEY};
use crate::entry::{
    ConfigEntry, EntryKind, ATTR_CN, ATTR_COMMENTS, ATTR_NETMASK, ATTR_OPTIONS,
};
use crate::store::EntryStore;
use crate::transcode::{decode, encode, FieldUpdates, VirtualAttrs};
use crate::DhcpError;

pub const OBJECTCLASS: &str = "dhcpsubnet";
pub const DEFAULT_NETMASK: u8 = 24;

pub fn key(cn: &str) -> String {
    format!("cn={cn},{CONTAINER_KEY}")
}

/// The address block a subnet entry describes, from its cn and netmask
/// attributes.
pub(crate) fn subnet_net(entry: &ConfigEntry) -> Result<Ipv4Net> {
    let cn = entry
        .first(ATTR_CN)
        .ok_or_else(|| DhcpError::NotFound("Subnet entry has no cn".to_string()))?;
    let addr =
        Ipv4Addr::from_str(cn).map_err(|_| DhcpError::InvalidIpAddress(cn.to_string()))?;
    let prefix = entry
        .first(ATTR_NETMASK)
        .unwrap_or("24")
        .parse::<u8>()
        .map_err(|_| DhcpError::InvalidPrefix(0))?;
    Ok(Ipv4Net::new(addr, prefix).map_err(|_| DhcpError::InvalidPrefix(prefix))?)
}

/// Create a subnet entry. The options list is provisioned with the
/// subnet-mask and broadcast-address lines computed from the address block.
pub fn subnet_add(
    store: &mut dyn EntryStore,
    addr: Ipv4Addr,
    netmask: u8,
    comments: Option<&str>,
) -> Result<ConfigEntry> {
    require_service(store)?;

    let net = Ipv4Net::new(addr, netmask).map_err(|_| DhcpError::InvalidPrefix(netmask))?;

    let cn = addr.to_string();
    let mut entry = base_entry(OBJECTCLASS, &cn);
    entry.set_single(ATTR_NETMASK, netmask.to_string());
    entry.set_attr(
        ATTR_OPTIONS,
        [
            format!("subnet-mask {}", net.netmask()),
            format!("broadcast-address {}", net.broadcast()),
        ],
    );
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }

    store.add(&key(&cn), entry.clone())?;
    Ok(entry)
}

/// Create a subnet from CIDR notation, keyed by the network address.
pub fn subnet_add_cidr(
    store: &mut dyn EntryStore,
    cidr: &str,
    comments: Option<&str>,
) -> Result<ConfigEntry> {
    let net = Ipv4Net::from_str(cidr).map_err(|_| DhcpError::InvalidCidr(cidr.to_string()))?;
    subnet_add(store, net.network(), net.prefix_len(), comments)
}

pub fn subnet_show(store: &dyn EntryStore, cn: &str) -> Result<(ConfigEntry, VirtualAttrs)> {
    let entry = store.get(&key(cn))?;
    let virtual_attrs = decode(EntryKind::Subnet, &entry)?;
    Ok((entry, virtual_attrs))
}

pub fn subnet_mod(
    store: &mut dyn EntryStore,
    cn: &str,
    updates: &FieldUpdates,
    comments: Option<&str>,
) -> Result<(ConfigEntry, VirtualAttrs)> {
    let subnet_key = key(cn);
    let mut entry = store.get(&subnet_key)?;
    encode(EntryKind::Subnet, &mut entry, updates)?;
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    store.update(&subnet_key, entry.clone())?;
    let virtual_attrs = decode(EntryKind::Subnet, &entry)?;
    Ok((entry, virtual_attrs))
}

/// Delete a subnet and any pool entries nested under it.
pub fn subnet_del(store: &mut dyn EntryStore, cn: &str) -> Result<()> {
    let subnet_key = key(cn);
    store.get(&subnet_key)?;

    let child_suffix = format!(",{subnet_key}");
    let children: Vec<String> = store
        .keys()
        .into_iter()
        .filter(|k| k.ends_with(&child_suffix))
        .collect();
    for child in children {
        store.delete(&child)?;
    }

    store.delete(&subnet_key)
}

pub fn subnet_find(
    store: &dyn EntryStore,
    needle: &str,
) -> Result<Vec<(String, ConfigEntry)>> {
    find_entries(store, OBJECTCLASS, needle, &[ATTR_CN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;
    use crate::objects::service::service_setup;
    use crate::store::MemoryStore;

    fn store_with_service() -> MemoryStore {
        let mut store = MemoryStore::new();
        service_setup(&mut store, None).unwrap();
        store
    }

    #[test]
    fn test_add_provisions_mask_and_broadcast() {
        let mut store = store_with_service();
        let entry = subnet_add(&mut store, Ipv4Addr::new(10, 0, 0, 0), 24, None).unwrap();
        assert_eq!(
            entry.attr(ATTR_OPTIONS),
            ["subnet-mask 255.255.255.0", "broadcast-address 10.0.0.255"]
        );
        assert_eq!(entry.first(ATTR_NETMASK), Some("24"));
    }

    #[test]
    fn test_add_requires_service() {
        let mut store = MemoryStore::new();
        let err = subnet_add(&mut store, Ipv4Addr::new(10, 0, 0, 0), 24, None).unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::NotConfigured));
    }

    #[test]
    fn test_add_cidr() {
        let mut store = store_with_service();
        let entry = subnet_add_cidr(&mut store, "192.168.1.0/24", None).unwrap();
        assert_eq!(entry.first(ATTR_CN), Some("192.168.1.0"));
        assert!(store.get("cn=192.168.1.0,cn=dhcp").is_ok());

        assert!(subnet_add_cidr(&mut store, "not-a-cidr", None).is_err());
    }

    #[test]
    fn test_mod_router() {
        let mut store = store_with_service();
        subnet_add(&mut store, Ipv4Addr::new(10, 0, 0, 0), 24, None).unwrap();

        let updates = vec![(
            "router".to_string(),
            FieldValue::Text("10.0.0.1".to_string()),
        )];
        let (entry, view) = subnet_mod(&mut store, "10.0.0.0", &updates, None).unwrap();
        assert_eq!(
            entry.attr(ATTR_OPTIONS),
            [
                "subnet-mask 255.255.255.0",
                "broadcast-address 10.0.0.255",
                "routers 10.0.0.1",
            ]
        );
        assert_eq!(view["router"], FieldValue::Text("10.0.0.1".to_string()));
    }

    #[test]
    fn test_del_removes_nested_pools() {
        let mut store = store_with_service();
        subnet_add(&mut store, Ipv4Addr::new(10, 0, 0, 0), 24, None).unwrap();
        store
            .add("cn=backyard,cn=10.0.0.0,cn=dhcp", ConfigEntry::new())
            .unwrap();

        subnet_del(&mut store, "10.0.0.0").unwrap();
        assert!(store.get("cn=10.0.0.0,cn=dhcp").is_err());
        assert!(store.get("cn=backyard,cn=10.0.0.0,cn=dhcp").is_err());
    }

    #[test]
    fn test_find_matches_cn_substring() {
        let mut store = store_with_service();
        subnet_add(&mut store, Ipv4Addr::new(10, 0, 0, 0), 24, None).unwrap();
        subnet_add(&mut store, Ipv4Addr::new(192, 168, 1, 0), 24, None).unwrap();

        let hits = subnet_find(&store, "192.168").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.first(ATTR_CN), Some("192.168.1.0"));

        // Empty needle matches all subnets, not the service entry.
        assert_eq!(subnet_find(&store, "").unwrap().len(), 2);
    }
}

use anyhow::Result;

use super::{base_entry, CONTAINER_KEY};
use crate::entry::{ConfigEntry, EntryKind, ATTR_COMMENTS};
use crate::store::EntryStore;
use crate::transcode::{decode, encode, FieldUpdates, VirtualAttrs};
use crate::DhcpError;

pub const OBJECTCLASS: &str = "dhcpservice";

pub fn service_exists(store: &dyn EntryStore) -> bool {
    store.get(CONTAINER_KEY).is_ok()
}

/// Fetch the service entry, surfacing a missing one as the user-facing
/// "DHCP is not configured" condition.
pub fn require_service(store: &dyn EntryStore) -> Result<ConfigEntry> {
    match store.get(CONTAINER_KEY) {
        Ok(entry) => Ok(entry),
        Err(e) => match e.downcast_ref::<DhcpError>() {
            Some(DhcpError::NotFound(_)) => Err(DhcpError::NotConfigured.into()),
            _ => Err(e),
        },
    }
}

/// Create the service container entry.
pub fn service_setup(store: &mut dyn EntryStore, comments: Option<&str>) -> Result<ConfigEntry> {
    let mut entry = base_entry(OBJECTCLASS, "dhcp");
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    store.add(CONTAINER_KEY, entry.clone())?;
    Ok(entry)
}

pub fn service_show(store: &dyn EntryStore) -> Result<(ConfigEntry, VirtualAttrs)> {
    let entry = require_service(store)?;
    let virtual_attrs = decode(EntryKind::Service, &entry)?;
    Ok((entry, virtual_attrs))
}

/// Apply virtual-field updates to the service entry. The raw lists are read
/// fresh from the store before the splice so concurrent edits to unrelated
/// keywords are not clobbered; `EmptyChange` on write-back is a success.
pub fn service_mod(
    store: &mut dyn EntryStore,
    updates: &FieldUpdates,
    comments: Option<&str>,
) -> Result<(ConfigEntry, VirtualAttrs)> {
    let mut entry = require_service(store)?;
    encode(EntryKind::Service, &mut entry, updates)?;
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    store.update(CONTAINER_KEY, entry.clone())?;
    let virtual_attrs = decode(EntryKind::Service, &entry)?;
    Ok((entry, virtual_attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ATTR_STATEMENTS;
    use crate::fields::FieldValue;
    use crate::store::MemoryStore;

    #[test]
    fn test_missing_service_is_not_configured() {
        let store = MemoryStore::new();
        let err = service_show(&store).unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::NotConfigured));
        assert_eq!(err.to_string(), "DHCP is not configured");
    }

    #[test]
    fn test_setup_then_mod() {
        let mut store = MemoryStore::new();
        service_setup(&mut store, None).unwrap();
        assert!(service_exists(&store));

        let updates = vec![
            ("defaultleasetime".to_string(), FieldValue::Int(3600)),
            ("maxleasetime".to_string(), FieldValue::Int(7200)),
        ];
        let (entry, view) = service_mod(&mut store, &updates, None).unwrap();
        assert_eq!(
            entry.attr(ATTR_STATEMENTS),
            ["default-lease-time 3600", "max-lease-time 7200"]
        );
        assert_eq!(view["defaultleasetime"], FieldValue::Int(3600));
    }

    #[test]
    fn test_mod_without_changes_is_accepted() {
        let mut store = MemoryStore::new();
        service_setup(&mut store, None).unwrap();
        // An empty update writes back an identical entry; EmptyChange from
        // the store must not surface as an error.
        service_mod(&mut store, &Vec::new(), None).unwrap();
    }
}

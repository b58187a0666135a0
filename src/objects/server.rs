use anyhow::Result;

use super::service::require_service;
use super::{base_entry, find_entries, CONTAINER_KEY};
use crate::entry::{ConfigEntry, ATTR_CN, ATTR_COMMENTS, ATTR_SECONDARY_DN, ATTR_SERVICE_DN};
use crate::store::EntryStore;

pub const OBJECTCLASS: &str = "dhcpserver";

pub fn key(cn: &str) -> String {
    format!("cn={cn},{CONTAINER_KEY}")
}

/// Register a server: create its entry and record it in the service entry's
/// secondary list. The service write tolerates `EmptyChange`.
pub fn server_add(
    store: &mut dyn EntryStore,
    hostname: &str,
    comments: Option<&str>,
) -> Result<ConfigEntry> {
    let mut service = require_service(store)?;

    let mut entry = base_entry(OBJECTCLASS, hostname);
    entry.set_single(ATTR_SERVICE_DN, CONTAINER_KEY);
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    let server_key = key(hostname);
    store.add(&server_key, entry.clone())?;

    let mut secondary: Vec<String> = service.attr(ATTR_SECONDARY_DN).to_vec();
    if !secondary.contains(&server_key) {
        secondary.push(server_key);
    }
    service.set_attr(ATTR_SECONDARY_DN, secondary);
    store.update(CONTAINER_KEY, service)?;

    Ok(entry)
}

/// Deregister a server: drop it from the service entry's secondary list
/// (absence is fine), then delete its entry.
pub fn server_del(store: &mut dyn EntryStore, hostname: &str) -> Result<()> {
    let mut service = require_service(store)?;
    let server_key = key(hostname);

    let secondary: Vec<String> = service
        .attr(ATTR_SECONDARY_DN)
        .iter()
        .filter(|dn| **dn != server_key)
        .cloned()
        .collect();
    service.set_attr(ATTR_SECONDARY_DN, secondary);
    store.update(CONTAINER_KEY, service)?;

    store.delete(&server_key)
}

pub fn server_show(store: &dyn EntryStore, cn: &str) -> Result<ConfigEntry> {
    store.get(&key(cn))
}

pub fn server_mod(
    store: &mut dyn EntryStore,
    cn: &str,
    comments: Option<&str>,
) -> Result<ConfigEntry> {
    let server_key = key(cn);
    let mut entry = store.get(&server_key)?;
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    store.update(&server_key, entry.clone())?;
    Ok(entry)
}

pub fn server_find(store: &dyn EntryStore, needle: &str) -> Result<Vec<(String, ConfigEntry)>> {
    find_entries(store, OBJECTCLASS, needle, &[ATTR_CN, ATTR_SERVICE_DN])
}

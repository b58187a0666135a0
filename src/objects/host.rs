use anyhow::Result;

use super::service::require_service;
use super::{base_entry, find_entries, CONTAINER_KEY};
use crate::entry::{
    ConfigEntry, ATTR_CN, ATTR_HWADDRESS, ATTR_OPTIONS, ATTR_STATEMENTS,
};
use crate::store::EntryStore;
use crate::DhcpError;

pub const OBJECTCLASS: &str = "dhcphost";

const HWADDRESS_PREFIX: &str = "ethernet ";

pub fn key(cn: &str) -> String {
    format!("cn={cn},{CONTAINER_KEY}")
}

/// Normalize a MAC address to uppercase colon form. Accepts `:` or `-`
/// separators, or twelve bare hex digits.
pub fn normalize_mac(mac: &str) -> Result<String> {
    let bare: String = mac.chars().filter(|c| !matches!(c, ':' | '-')).collect();
    if bare.len() != 12 || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DhcpError::InvalidMacAddress(mac.to_string()).into());
    }
    let upper = bare.to_uppercase();
    let octets: Vec<&str> = (0..6).map(|i| &upper[i * 2..i * 2 + 2]).collect();
    Ok(octets.join(":"))
}

/// Storage cn for a host pseudo-object keyed by hostname plus MAC:
/// `<hostname>-<MAC uppercased, colons removed>`.
///
/// Deterministic and collision-aware for reasonable inputs; a hostname that
/// itself embeds the generated pattern is an accepted edge case, not
/// defended against.
pub fn derive_host_key(hostname: &str, mac: &str) -> String {
    let bare: String = mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-'))
        .collect::<String>()
        .to_uppercase();
    format!("{hostname}-{bare}")
}

/// Create the DHCP record for one (hostname, MAC) pair: a fixed-address
/// statement and a host-name option alongside the hardware address.
pub fn host_add(
    store: &mut dyn EntryStore,
    hostname: &str,
    mac: &str,
) -> Result<(String, ConfigEntry)> {
    require_service(store)?;
    let mac = normalize_mac(mac)?;
    let cn = derive_host_key(hostname, &mac);

    let mut entry = base_entry(OBJECTCLASS, &cn);
    entry.set_single(ATTR_HWADDRESS, format!("{HWADDRESS_PREFIX}{mac}"));
    entry.set_attr(ATTR_STATEMENTS, [format!("fixed-address {hostname}")]);
    entry.set_attr(ATTR_OPTIONS, [format!("host-name \"{hostname}\"")]);

    store.add(&key(&cn), entry.clone())?;
    Ok((cn, entry))
}

pub fn host_del(store: &mut dyn EntryStore, hostname: &str, mac: &str) -> Result<String> {
    let mac = normalize_mac(mac)?;
    let cn = derive_host_key(hostname, &mac);
    store.delete(&key(&cn))?;
    Ok(cn)
}

pub fn host_show(store: &dyn EntryStore, cn: &str) -> Result<ConfigEntry> {
    store.get(&key(cn))
}

pub fn host_find(store: &dyn EntryStore, needle: &str) -> Result<Vec<(String, ConfigEntry)>> {
    find_entries(store, OBJECTCLASS, needle, &[ATTR_CN, ATTR_HWADDRESS])
}

/// Reconcile a host's DHCP records with its desired MAC list: records for
/// dropped MACs are deleted, missing ones created, matching ones left
/// alone. The host-lifecycle collaborator calls this synchronously on host
/// add/modify/delete (an empty list removes every record).
pub fn host_sync_macs(
    store: &mut dyn EntryStore,
    hostname: &str,
    macs: &[String],
) -> Result<()> {
    let mut wanted = Vec::with_capacity(macs.len());
    for mac in macs {
        wanted.push(normalize_mac(mac)?);
    }

    let key_prefix = format!("cn={hostname}-");
    for (entry_key, entry) in find_entries(store, OBJECTCLASS, "", &[])? {
        if !entry_key.starts_with(&key_prefix) {
            continue;
        }
        let entry_mac = entry
            .first(ATTR_HWADDRESS)
            .map(|hw| hw.trim_start_matches(HWADDRESS_PREFIX).to_string())
            .unwrap_or_default();
        if let Some(pos) = wanted.iter().position(|m| *m == entry_mac) {
            wanted.remove(pos);
        } else {
            store.delete(&entry_key)?;
        }
    }

    for mac in wanted {
        host_add(store, hostname, &mac)?;
    }

    Ok(())
}

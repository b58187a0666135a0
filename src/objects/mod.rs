//! Entry-kind CRUD built on an [`EntryStore`](crate::store::EntryStore):
//! decode on read paths, encode on write paths. The store is always an
//! explicit argument, never ambient state.

use anyhow::Result;

use crate::entry::{ConfigEntry, ATTR_CN, ATTR_ENTRY_UUID, ATTR_OBJECTCLASS};
use crate::store::EntryStore;

pub mod host;
pub mod pool;
pub mod server;
pub mod service;
pub mod subnet;

/// All entries live under the service container.
pub const CONTAINER_KEY: &str = "cn=dhcp";

/// A fresh entry skeleton: objectclass, cn and a v4 entryuuid tag.
pub(crate) fn base_entry(objectclass: &str, cn: &str) -> ConfigEntry {
    let mut entry = ConfigEntry::new();
    entry.set_single(ATTR_OBJECTCLASS, objectclass);
    entry.set_single(ATTR_CN, cn);
    entry.set_single(ATTR_ENTRY_UUID, uuid::Uuid::new_v4().to_string());
    entry
}

/// Case-insensitive substring search over entries of one objectclass,
/// matching any of the given attributes.
pub(crate) fn find_entries(
    store: &dyn EntryStore,
    objectclass: &str,
    needle: &str,
    search_attrs: &[&str],
) -> Result<Vec<(String, ConfigEntry)>> {
    let needle = needle.to_lowercase();
    let mut matched = Vec::new();

    for key in store.keys() {
        let entry = store.get(&key)?;
        if !entry
            .attr(ATTR_OBJECTCLASS)
            .iter()
            .any(|c| c.eq_ignore_ascii_case(objectclass))
        {
            continue;
        }
        let hit = needle.is_empty()
            || search_attrs.iter().any(|attr| {
                entry
                    .attr(attr)
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            });
        if hit {
            matched.push((key, entry));
        }
    }

    Ok(matched)
}

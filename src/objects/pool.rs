use anyhow::{bail, Result};

use super::service::require_service;
use super::subnet::{self, subnet_net};
use super::{base_entry, find_entries};
use crate::entry::{
    ConfigEntry, EntryKind, ATTR_CN, ATTR_COMMENTS, ATTR_OPTIONS, ATTR_PERMIT_LIST, ATTR_RANGE,
    ATTR_STATEMENTS,
};
use crate::range::{parse_range, validate_pool_range, RangeCheck};
use crate::store::EntryStore;
use crate::transcode::{decode, encode, FieldUpdates, VirtualAttrs};
use crate::DhcpError;

pub const OBJECTCLASS: &str = "dhcppool";

/// Every pool allows both client classes unless the caller says otherwise.
pub const DEFAULT_PERMIT_LIST: [&str; 2] = ["allow unknown-clients", "allow known-clients"];

/// Lease-time statements copied down from the service at pool creation.
const INHERITED_STATEMENTS: [&str; 2] = ["default-lease-time ", "max-lease-time "];

pub fn key(subnet_cn: &str, name: &str) -> String {
    format!("cn={name},{}", subnet::key(subnet_cn))
}

/// Caller-supplied initial content for a new pool.
#[derive(Debug, Clone, Default)]
pub struct PoolCreate {
    pub permit_list: Option<Vec<String>>,
    pub statements: Vec<String>,
    pub options: Vec<String>,
    pub comments: Option<String>,
}

/// Create a pool under a subnet.
///
/// The range must parse and fit the parent subnet; the permit list defaults
/// to allowing both client classes; lease-time statements the pool doesn't
/// define itself are copied once from the service entry. That inheritance is
/// a creation-time copy, not a live link.
pub fn pool_add(
    store: &mut dyn EntryStore,
    subnet_cn: &str,
    name: &str,
    range: &str,
    create: &PoolCreate,
) -> Result<ConfigEntry> {
    let service = require_service(store)?;
    let subnet_entry = store.get(&subnet::key(subnet_cn))?;

    let net = subnet_net(&subnet_entry)?;
    let (start, end) = parse_range(range)?;
    let check = validate_pool_range(net.addr(), net.prefix_len(), start, end)?;
    if !check.is_valid() {
        bail!("{check}");
    }

    let mut entry = base_entry(OBJECTCLASS, name);
    entry.set_single(ATTR_RANGE, range);
    match &create.permit_list {
        Some(permit_list) => entry.set_attr(ATTR_PERMIT_LIST, permit_list.clone()),
        None => entry.set_attr(ATTR_PERMIT_LIST, DEFAULT_PERMIT_LIST),
    }

    let mut statements = create.statements.clone();
    for prefix in INHERITED_STATEMENTS {
        if statements.iter().any(|s| s.starts_with(prefix)) {
            continue;
        }
        if let Some(line) = service
            .attr(ATTR_STATEMENTS)
            .iter()
            .find(|s| s.starts_with(prefix))
        {
            statements.push(line.clone());
        }
    }
    entry.set_attr(ATTR_STATEMENTS, statements);
    entry.set_attr(ATTR_OPTIONS, create.options.clone());
    if let Some(comments) = &create.comments {
        entry.set_single(ATTR_COMMENTS, comments.clone());
    }

    store.add(&key(subnet_cn, name), entry.clone())?;
    Ok(entry)
}

pub fn pool_show(
    store: &dyn EntryStore,
    subnet_cn: &str,
    name: &str,
) -> Result<(ConfigEntry, VirtualAttrs)> {
    let entry = store.get(&key(subnet_cn, name))?;
    let virtual_attrs = decode(EntryKind::Pool, &entry)?;
    Ok((entry, virtual_attrs))
}

pub fn pool_mod(
    store: &mut dyn EntryStore,
    subnet_cn: &str,
    name: &str,
    updates: &FieldUpdates,
    comments: Option<&str>,
) -> Result<(ConfigEntry, VirtualAttrs)> {
    let pool_key = key(subnet_cn, name);
    let mut entry = store.get(&pool_key)?;
    encode(EntryKind::Pool, &mut entry, updates)?;
    if let Some(comments) = comments {
        entry.set_single(ATTR_COMMENTS, comments);
    }
    store.update(&pool_key, entry.clone())?;
    let virtual_attrs = decode(EntryKind::Pool, &entry)?;
    Ok((entry, virtual_attrs))
}

pub fn pool_del(store: &mut dyn EntryStore, subnet_cn: &str, name: &str) -> Result<()> {
    store.delete(&key(subnet_cn, name))
}

pub fn pool_find(store: &dyn EntryStore, needle: &str) -> Result<Vec<(String, ConfigEntry)>> {
    find_entries(store, OBJECTCLASS, needle, &[ATTR_CN, ATTR_RANGE])
}

/// Advisory check that a proposed range fits a subnet, for UI consumers.
///
/// Any failure to resolve the parent subnet (missing entry, unparsable cn or
/// netmask) collapses into the single "No such subnet." outcome rather than
/// being discriminated further.
pub fn pool_check_range(
    store: &dyn EntryStore,
    subnet_cn: &str,
    range: &str,
) -> Result<RangeCheck> {
    let net = store
        .get(&subnet::key(subnet_cn))
        .and_then(|entry| subnet_net(&entry))
        .map_err(|_| DhcpError::NotFound("No such subnet.".to_string()))?;

    let (start, end) = parse_range(range)?;
    validate_pool_range(net.addr(), net.prefix_len(), start, end)
}

use anyhow::Result;
use std::collections::BTreeMap;

use crate::entry::ConfigEntry;
use crate::DhcpError;

/// Result of a write that went through. `EmptyChange` means the submitted
/// entry was identical to the stored one; callers treat it as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    EmptyChange,
}

/// The external directory collaborator: entries addressed by key, each a
/// mapping from attribute name to an ordered value list.
///
/// No locking is provided. Callers perform read-modify-write per request;
/// two concurrent writers to the same entry can silently lose one side's
/// change. Serializing access is the caller's job.
pub trait EntryStore {
    /// Fetch an entry. Missing keys are `DhcpError::NotFound`.
    fn get(&self, key: &str) -> Result<ConfigEntry>;

    /// Create a new entry. An existing key is `DhcpError::AlreadyExists`.
    fn add(&mut self, key: &str, entry: ConfigEntry) -> Result<()>;

    /// Replace an entry wholesale. Missing keys are `DhcpError::NotFound`.
    fn update(&mut self, key: &str, entry: ConfigEntry) -> Result<UpdateOutcome>;

    /// Remove an entry. Missing keys are `DhcpError::NotFound`.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// All entry keys, in sorted order.
    fn keys(&self) -> Vec<String>;
}

/// In-memory store, used by tests and as the backing of `FileStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, ConfigEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<String, ConfigEntry> {
        &self.entries
    }

    pub(crate) fn insert_raw(&mut self, key: String, entry: ConfigEntry) {
        self.entries.insert(key, entry);
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, key: &str) -> Result<ConfigEntry> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| DhcpError::NotFound(format!("No such entry: {key}")).into())
    }

    fn add(&mut self, key: &str, entry: ConfigEntry) -> Result<()> {
        if self.entries.contains_key(key) {
            return Err(DhcpError::AlreadyExists(key.to_string()).into());
        }
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn update(&mut self, key: &str, entry: ConfigEntry) -> Result<UpdateOutcome> {
        let Some(existing) = self.entries.get_mut(key) else {
            return Err(DhcpError::NotFound(format!("No such entry: {key}")).into());
        };
        if *existing == entry {
            return Ok(UpdateOutcome::EmptyChange);
        }
        *existing = entry;
        Ok(UpdateOutcome::Updated)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Err(DhcpError::NotFound(format!("No such entry: {key}")).into());
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

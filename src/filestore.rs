use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::entry::ConfigEntry;
use crate::store::{EntryStore, MemoryStore, UpdateOutcome};

const ROOT_ELEMENT: &str = "dhcpdir";
const ENTRY_ELEMENT: &str = "entry";
const KEY_ATTRIBUTE: &str = "key";

/// XML-file-backed entry store.
///
/// The document root is `<dhcpdir>`, with one `<entry key="...">` child per
/// directory entry and one child element per attribute value; repeated
/// elements of the same name preserve the attribute's value order. The whole
/// file is loaded on open and replaced atomically on save.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open a store file. A missing file yields an empty store so the first
    /// mutating command can create it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut inner = MemoryStore::new();

        if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open store file: {}", path.display()))?;
            let root = Element::parse(file)
                .with_context(|| format!("Failed to parse store file: {}", path.display()))?;
            for (key, entry) in parse_entries(&root)? {
                inner.insert_raw(key, entry);
            }
        }

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the current in-memory state without touching the file.
    /// Used for dry-run diffing.
    pub fn render(&self) -> Result<String> {
        let root = self.to_element();
        let mut buf = Vec::new();
        let emitter_config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ")
            .write_document_declaration(true);
        root.write_with_config(&mut buf, emitter_config)
            .context("Failed to serialize store")?;
        let mut out = String::from_utf8(buf).context("Store serialized to invalid UTF-8")?;
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the store back to its file: temporary file alongside, sync,
    /// then rename over the original.
    pub fn save(&self) -> Result<()> {
        let rendered = self.render()?;

        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", std::process::id()));
        let tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!("Failed to create temporary store file: {}", tmp_path.display())
            })?;

        let result = (|| -> Result<()> {
            use std::io::Write;
            let mut tmp_file = tmp_file;
            tmp_file
                .write_all(rendered.as_bytes())
                .with_context(|| format!("Failed to write store file: {}", tmp_path.display()))?;
            tmp_file.sync_all().with_context(|| {
                format!("Failed to sync temporary store file: {}", tmp_path.display())
            })?;
            std::fs::rename(&tmp_path, &self.path).with_context(|| {
                format!("Failed to replace store file: {}", self.path.display())
            })?;
            Ok(())
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
        }
        result
    }

    fn to_element(&self) -> Element {
        let mut root = Element::new(ROOT_ELEMENT);
        for (key, entry) in self.inner.entries() {
            let mut entry_elem = Element::new(ENTRY_ELEMENT);
            entry_elem
                .attributes
                .insert(KEY_ATTRIBUTE.to_string(), key.clone());
            for (name, values) in entry.iter() {
                for value in values {
                    let mut attr_elem = Element::new(name);
                    if !value.is_empty() {
                        attr_elem.children.push(XMLNode::Text(value.clone()));
                    }
                    entry_elem.children.push(XMLNode::Element(attr_elem));
                }
            }
            root.children.push(XMLNode::Element(entry_elem));
        }
        root
    }
}

fn parse_entries(root: &Element) -> Result<Vec<(String, ConfigEntry)>> {
    let mut entries = Vec::new();

    for node in &root.children {
        let Some(elem) = node.as_element() else {
            continue;
        };
        if elem.name != ENTRY_ELEMENT {
            continue;
        }
        let key = elem
            .attributes
            .get(KEY_ATTRIBUTE)
            .cloned()
            .context("Store entry is missing its key attribute")?;

        let mut entry = ConfigEntry::new();
        for child in &elem.children {
            if let Some(attr_elem) = child.as_element() {
                let value = attr_elem
                    .get_text()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                entry.push_attr(&attr_elem.name, value);
            }
        }
        entries.push((key, entry));
    }

    Ok(entries)
}

/// Parse a rendered store document, for callers that hold the XML in memory.
pub fn parse_store(text: &str) -> Result<Vec<(String, ConfigEntry)>> {
    let root = Element::parse(Cursor::new(text.as_bytes())).context("Failed to parse XML")?;
    parse_entries(&root)
}

impl EntryStore for FileStore {
    fn get(&self, key: &str) -> Result<ConfigEntry> {
        self.inner.get(key)
    }

    fn add(&mut self, key: &str, entry: ConfigEntry) -> Result<()> {
        self.inner.add(key, entry)
    }

    fn update(&mut self, key: &str, entry: ConfigEntry) -> Result<UpdateOutcome> {
        self.inner.update(key, entry)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

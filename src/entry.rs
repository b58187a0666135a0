use std::collections::BTreeMap;

/// Attribute names the object layer relies on. Raw ISC configuration lines
/// live in `ATTR_STATEMENTS`, `ATTR_OPTIONS` and `ATTR_PERMIT_LIST`; the rest
/// are plain single- or multi-valued attributes.
pub const ATTR_CN: &str = "cn";
pub const ATTR_OBJECTCLASS: &str = "objectclass";
pub const ATTR_STATEMENTS: &str = "statements";
pub const ATTR_OPTIONS: &str = "options";
pub const ATTR_PERMIT_LIST: &str = "permitlist";
pub const ATTR_NETMASK: &str = "netmask";
pub const ATTR_RANGE: &str = "range";
pub const ATTR_HWADDRESS: &str = "hwaddress";
pub const ATTR_COMMENTS: &str = "comments";
pub const ATTR_SECONDARY_DN: &str = "secondarydn";
pub const ATTR_SERVICE_DN: &str = "servicedn";
pub const ATTR_ENTRY_UUID: &str = "entryuuid";

/// The entry kinds the directory schema distinguishes. Host and Server carry
/// raw statement/option lists like everything else but expose no virtual
/// fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Service,
    Subnet,
    Pool,
    Host,
    Server,
}

/// A directory record: a mapping from attribute name to an ordered list of
/// opaque strings. Order within an attribute's value list is significant;
/// the transcoder depends on it being preserved across read-modify-write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEntry {
    attrs: BTreeMap<String, Vec<String>>,
}

impl ConfigEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All values of an attribute, in stored order. Absent means empty.
    pub fn attr(&self, name: &str) -> &[String] {
        self.attrs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of an attribute, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attr(name).first().map(String::as_str)
    }

    /// Replace the full value list of an attribute. An empty list removes
    /// the attribute.
    pub fn set_attr<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.attrs.remove(name);
        } else {
            self.attrs.insert(name.to_string(), values);
        }
    }

    /// Set a single-valued attribute.
    pub fn set_single(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(name.to_string(), vec![value.into()]);
    }

    /// Append one value to an attribute's list.
    pub fn push_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Vec<String>> {
        self.attrs.remove(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Iterate attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

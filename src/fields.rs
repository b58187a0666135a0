use crate::entry::{EntryKind, ATTR_OPTIONS, ATTR_PERMIT_LIST, ATTR_STATEMENTS};

/// Which raw list a field's line lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Statements,
    Options,
    PermitList,
}

impl Target {
    pub fn attr_name(self) -> &'static str {
        match self {
            Target::Statements => ATTR_STATEMENTS,
            Target::Options => ATTR_OPTIONS,
            Target::PermitList => ATTR_PERMIT_LIST,
        }
    }
}

/// How a field's line is recognized within its raw list.
///
/// Permit flags match by suffix because the value-bearing word
/// (`allow`/`deny`) is the line's own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Exact literal prefix including the trailing space, e.g.
    /// `"default-lease-time "`.
    Prefix(&'static str),
    /// Exact literal suffix including the leading space, e.g.
    /// `" known-clients"`.
    Suffix(&'static str),
}

impl Matcher {
    pub fn matches(self, line: &str) -> bool {
        match self {
            Matcher::Prefix(p) => line.starts_with(p),
            Matcher::Suffix(s) => line.ends_with(s),
        }
    }
}

/// How a matched line's payload maps to and from a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Decimal integer, e.g. `default-lease-time 3600`.
    Integer,
    /// Double-quoted string, quotes stripped on decode.
    QuotedText,
    /// `", "`-separated list of bare tokens.
    PlainList,
    /// `", "`-separated list of double-quoted strings.
    QuotedList,
    /// Single bare token, taken verbatim.
    Token,
    /// Whole line is `allow <keyword>` or `deny <keyword>`.
    PermitFlag,
}

/// A decoded virtual-field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(u32),
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<u32> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v}"),
            FieldValue::List(v) => write!(f, "{}", v.join(", ")),
            FieldValue::Flag(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
        }
    }
}

/// One row of the virtual-field registry. Decode and encode iterate these
/// generically, so adding a field is a single new row here.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub target: Target,
    pub matcher: Matcher,
    pub shape: Shape,
}

const DEFAULT_LEASE_TIME: FieldSpec = FieldSpec {
    name: "defaultleasetime",
    target: Target::Statements,
    matcher: Matcher::Prefix("default-lease-time "),
    shape: Shape::Integer,
};

const MAX_LEASE_TIME: FieldSpec = FieldSpec {
    name: "maxleasetime",
    target: Target::Statements,
    matcher: Matcher::Prefix("max-lease-time "),
    shape: Shape::Integer,
};

const DOMAIN_NAME: FieldSpec = FieldSpec {
    name: "domainname",
    target: Target::Options,
    matcher: Matcher::Prefix("domain-name "),
    shape: Shape::QuotedText,
};

const DOMAIN_NAME_SERVERS: FieldSpec = FieldSpec {
    name: "domainnameservers",
    target: Target::Options,
    matcher: Matcher::Prefix("domain-name-servers "),
    shape: Shape::PlainList,
};

const DOMAIN_SEARCH: FieldSpec = FieldSpec {
    name: "domainsearch",
    target: Target::Options,
    matcher: Matcher::Prefix("domain-search "),
    shape: Shape::QuotedList,
};

const ROUTER: FieldSpec = FieldSpec {
    name: "router",
    target: Target::Options,
    matcher: Matcher::Prefix("routers "),
    shape: Shape::Token,
};

const PERMIT_KNOWN_CLIENTS: FieldSpec = FieldSpec {
    name: "permitknownclients",
    target: Target::PermitList,
    matcher: Matcher::Suffix(" known-clients"),
    shape: Shape::PermitFlag,
};

const PERMIT_UNKNOWN_CLIENTS: FieldSpec = FieldSpec {
    name: "permitunknownclients",
    target: Target::PermitList,
    matcher: Matcher::Suffix(" unknown-clients"),
    shape: Shape::PermitFlag,
};

const SERVICE_FIELDS: &[FieldSpec] = &[
    DEFAULT_LEASE_TIME,
    MAX_LEASE_TIME,
    DOMAIN_NAME,
    DOMAIN_NAME_SERVERS,
    DOMAIN_SEARCH,
];

const SUBNET_FIELDS: &[FieldSpec] = &[ROUTER];

const POOL_FIELDS: &[FieldSpec] = &[
    DEFAULT_LEASE_TIME,
    MAX_LEASE_TIME,
    DOMAIN_NAME,
    DOMAIN_NAME_SERVERS,
    DOMAIN_SEARCH,
    PERMIT_KNOWN_CLIENTS,
    PERMIT_UNKNOWN_CLIENTS,
];

/// Virtual fields exposed by an entry kind. Hosts and servers store raw
/// statement/option lists but expose no typed view over them.
pub fn registry(kind: EntryKind) -> &'static [FieldSpec] {
    match kind {
        EntryKind::Service => SERVICE_FIELDS,
        EntryKind::Subnet => SUBNET_FIELDS,
        EntryKind::Pool => POOL_FIELDS,
        EntryKind::Host | EntryKind::Server => &[],
    }
}

/// Look up a field spec by name within a kind's registry.
pub fn field_spec(kind: EntryKind, name: &str) -> Option<&'static FieldSpec> {
    registry(kind).iter().find(|spec| spec.name == name)
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DhcpError {
    #[error("DHCP is not configured")]
    NotConfigured,

    #[error("{0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Malformed {keyword} line: {line:?}")]
    MalformedConfigLine { keyword: String, line: String },

    #[error("Unknown field for this entry kind: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected} value")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid prefix length: {0}")]
    InvalidPrefix(u8),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid range (expected \"<first-ip> <last-ip>\"): {0}")]
    InvalidRange(String),

    #[error("Invalid MAC address (expected HH:HH:HH:HH:HH:HH): {0}")]
    InvalidMacAddress(String),
}

pub mod cli;
mod entry;
mod errors;
mod fields;
mod filestore;
pub mod objects;
mod range;
mod store;
mod transcode;

pub use entry::{ConfigEntry, EntryKind};
pub use entry::{
    ATTR_CN, ATTR_COMMENTS, ATTR_ENTRY_UUID, ATTR_HWADDRESS, ATTR_NETMASK, ATTR_OBJECTCLASS,
    ATTR_OPTIONS, ATTR_PERMIT_LIST, ATTR_RANGE, ATTR_SECONDARY_DN, ATTR_SERVICE_DN,
    ATTR_STATEMENTS,
};
pub use errors::DhcpError;
pub use fields::{field_spec, registry, FieldSpec, FieldValue, Matcher, Shape, Target};
pub use filestore::{parse_store, FileStore};
pub use range::{parse_range, validate_pool_range, RangeCheck};
pub use store::{EntryStore, MemoryStore, UpdateOutcome};
pub use transcode::{decode, encode, FieldUpdates, VirtualAttrs};

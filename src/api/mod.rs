//! Purpose: Define the public Rust API boundary for jsonbundle.
//! Exports: `Codec`, resource providers, convention field types, and the error model.
//! Role: Public, additive-only surface; hides the date-pattern engine and JSON boundary.
//! Invariants: This module is the only public path to codec and provider types.
//! Invariants: Internal modules remain private and are not directly exposed.

mod codec;
mod resource;

pub use crate::core::convention::{Binary, Timestamp, binary, timestamp};
pub use crate::core::date_pattern::{DEFAULT_DECODE_PATTERN, ENCODE_PATTERN};
pub use crate::core::error::{DecodeCategory, Error, ErrorKind, to_exit_code};
pub use codec::Codec;
pub use resource::{
    DEFAULT_MAP_THRESHOLD, DirProvider, MemoryProvider, RESOURCE_EXTENSION, RawResource,
    ResourceName, ResourceProvider, default_resource_dir,
};

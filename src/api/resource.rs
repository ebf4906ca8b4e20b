//! Purpose: Resolve named bundled JSON resources to raw bytes.
//! Exports: `ResourceName`, `RawResource`, `ResourceProvider`, `DirProvider`, `MemoryProvider`.
//! Role: External-collaborator seam for the codec; providers only hand out bytes.
//! Invariants: Names are non-empty, carry no path separators or `..`, and map to `<name>.json`.
//! Invariants: A missing resource is always `ErrorKind::NotFound`, never silence.
//! Invariants: Resources are treated as immutable for the lifetime of a `RawResource`.
#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use memmap2::Mmap;

use crate::core::error::{Error, ErrorKind, map_io_error_kind};

pub const RESOURCE_EXTENSION: &str = "json";

/// Files at least this large are memory-mapped instead of read.
pub const DEFAULT_MAP_THRESHOLD: u64 = 64 * 1024;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ResourceNameError {
    Empty,
    ContainsPathSeparator,
    ParentReference,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ResourceName(String);

impl ResourceName {
    /// Accepts `catalog` or `catalog.json`; both name the same resource.
    pub fn parse(name: &str) -> Result<Self, Error> {
        resolve_name(name)
            .map(Self)
            .map_err(|err| map_resource_name_error(name, err))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.{RESOURCE_EXTENSION}", self.0)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn resolve_name(name: &str) -> Result<String, ResourceNameError> {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    if stem.is_empty() {
        return Err(ResourceNameError::Empty);
    }
    if stem.contains('/') || stem.contains('\\') {
        return Err(ResourceNameError::ContainsPathSeparator);
    }
    if stem == "." || stem == ".." {
        return Err(ResourceNameError::ParentReference);
    }
    Ok(stem.to_string())
}

fn map_resource_name_error(name: &str, err: ResourceNameError) -> Error {
    let message = match err {
        ResourceNameError::Empty => "resource name must not be empty",
        ResourceNameError::ContainsPathSeparator => "resource name must not contain path separators",
        ResourceNameError::ParentReference => "resource name must not be `.` or `..`",
    };
    Error::new(ErrorKind::Usage)
        .with_message(message)
        .with_resource(name)
}

enum Storage {
    Shared(Bytes),
    Mapped(Mmap),
}

/// The full contents of one resource, held in memory or mapped read-only.
pub struct RawResource {
    name: String,
    storage: Storage,
}

impl RawResource {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Shared(data.into()),
        }
    }

    fn mapped(name: impl Into<String>, map: Mmap) -> Self {
        Self {
            name: name.into(),
            storage: Storage::Mapped(map),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Shared(bytes) => &bytes[..],
            Storage::Mapped(map) => &map[..],
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped(_))
    }
}

impl Deref for RawResource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for RawResource {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for RawResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResource")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// Source of named resource bytes.
pub trait ResourceProvider: Send + Sync {
    fn fetch(&self, name: &ResourceName) -> Result<RawResource, Error>;

    /// Names of every available resource, sorted, without the `.json` suffix.
    fn names(&self) -> Result<Vec<String>, Error>;
}

pub fn default_resource_dir() -> PathBuf {
    std::env::var_os("JSONBUNDLE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resources stored as `<dir>/<name>.json` files.
#[derive(Clone, Debug)]
pub struct DirProvider {
    dir: PathBuf,
    map_threshold: u64,
}

impl DirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            map_threshold: DEFAULT_MAP_THRESHOLD,
        }
    }

    pub fn with_map_threshold(mut self, map_threshold: u64) -> Self {
        self.map_threshold = map_threshold.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(&self, name: &ResourceName, path: &Path) -> Result<RawResource, Error> {
        let mut file = File::open(path).map_err(|err| match map_io_error_kind(&err) {
            ErrorKind::NotFound => not_found(name).with_path(path),
            kind => read_failure(kind, name, path, err),
        })?;

        let len = file
            .metadata()
            .map(|meta| meta.len())
            .map_err(|err| read_failure(map_io_error_kind(&err), name, path, err))?;

        if len >= self.map_threshold {
            // SAFETY: bundled resources are read-only for the lifetime of the mapping.
            let map = unsafe { Mmap::map(&file) }
                .map_err(|err| read_failure(ErrorKind::Io, name, path, err))?;
            return Ok(RawResource::mapped(name.as_str(), map));
        }

        let mut data = Vec::with_capacity(len as usize);
        file.read_to_end(&mut data)
            .map_err(|err| read_failure(map_io_error_kind(&err), name, path, err))?;
        Ok(RawResource::from_bytes(name.as_str(), data))
    }
}

impl ResourceProvider for DirProvider {
    fn fetch(&self, name: &ResourceName) -> Result<RawResource, Error> {
        let path = self.dir.join(name.file_name());
        self.read_file(name, &path)
    }

    fn names(&self) -> Result<Vec<String>, Error> {
        let entries = std::fs::read_dir(&self.dir).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to read resource directory")
                .with_path(&self.dir)
                .with_source(err)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read resource directory entry")
                    .with_path(&self.dir)
                    .with_source(err)
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(RESOURCE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Resources registered in memory, e.g. from `include_bytes!`.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    resources: BTreeMap<String, Bytes>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: &str, data: impl Into<Bytes>) -> Result<(), Error> {
        let name = ResourceName::parse(name)?;
        self.resources.insert(name.0, data.into());
        Ok(())
    }

    pub fn with_resource(mut self, name: &str, data: impl Into<Bytes>) -> Result<Self, Error> {
        self.insert(name, data)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceProvider for MemoryProvider {
    fn fetch(&self, name: &ResourceName) -> Result<RawResource, Error> {
        self.resources
            .get(name.as_str())
            .map(|data| RawResource::from_bytes(name.as_str(), data.clone()))
            .ok_or_else(|| not_found(name))
    }

    fn names(&self) -> Result<Vec<String>, Error> {
        Ok(self.resources.keys().cloned().collect())
    }
}

fn not_found(name: &ResourceName) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("resource not found")
        .with_resource(name.as_str())
}

fn read_failure(kind: ErrorKind, name: &ResourceName, path: &Path, err: std::io::Error) -> Error {
    Error::new(kind)
        .with_message("failed to read resource")
        .with_resource(name.as_str())
        .with_path(path)
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{MemoryProvider, ResourceName, ResourceProvider};
    use crate::core::error::ErrorKind;

    #[test]
    fn names_strip_json_suffix() {
        assert_eq!(ResourceName::parse("catalog").expect("plain").as_str(), "catalog");
        assert_eq!(ResourceName::parse("catalog.json").expect("suffixed").as_str(), "catalog");
        assert_eq!(
            ResourceName::parse("catalog").expect("plain").file_name(),
            "catalog.json"
        );
    }

    #[test]
    fn invalid_names_are_usage_errors() {
        for name in ["", ".json", "a/b", "a\\b", "..", "."] {
            let err = ResourceName::parse(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "name {name:?}");
        }
    }

    #[test]
    fn memory_provider_serves_registered_bytes() {
        let provider = MemoryProvider::new()
            .with_resource("b", &b"[]"[..])
            .expect("b")
            .with_resource("a.json", b"{}".to_vec())
            .expect("a");
        assert_eq!(provider.names().expect("names"), vec!["a", "b"]);
        assert_eq!(provider.len(), 2);
        assert!(!provider.is_empty());
        assert!(MemoryProvider::new().is_empty());

        let raw = provider
            .fetch(&ResourceName::parse("a").expect("name"))
            .expect("fetch");
        assert_eq!(raw.name(), "a");
        assert_eq!(&*raw, b"{}");
        assert!(!raw.is_mapped());
    }

    #[test]
    fn memory_provider_missing_is_not_found() {
        let provider = MemoryProvider::new();
        let err = provider
            .fetch(&ResourceName::parse("missing").expect("name"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.resource(), Some("missing"));
    }
}

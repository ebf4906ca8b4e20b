//! Purpose: Cover directory-backed resource lookup end to end.
//! Exports: Integration tests only.
//! Role: Verify `<dir>/<name>.json` resolution, listing, mapping, and error kinds.
//! Invariants: Each test uses its own temporary directory.

use std::error::Error as _;
use std::fs;

use jsonbundle::api::{
    Codec, DirProvider, ErrorKind, RESOURCE_EXTENSION, ResourceName, ResourceProvider,
};
use serde_json::Value;

#[test]
fn fetches_named_json_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("catalog.json"), br#"{"a":1}"#).expect("write");

    let codec = Codec::new(DirProvider::new(temp.path()));
    let raw = codec.fetch("catalog").expect("fetch");
    assert_eq!(raw.name(), "catalog");
    assert_eq!(&*raw, br#"{"a":1}"#);
    assert!(!raw.is_mapped());

    let value: Value = codec.load("catalog").expect("load");
    assert_eq!(value["a"], 1);
}

#[test]
fn large_files_are_memory_mapped() {
    let temp = tempfile::tempdir().expect("tempdir");
    let body = format!("[{}0]", "0,".repeat(2048));
    fs::write(temp.path().join("big.json"), &body).expect("write");

    let provider = DirProvider::new(temp.path()).with_map_threshold(1024);
    let raw = provider
        .fetch(&ResourceName::parse("big").expect("name"))
        .expect("fetch");
    assert!(raw.is_mapped());
    assert_eq!(raw.len(), body.len());

    let values: Vec<u8> = Codec::new(provider).decode(&raw).expect("decode");
    assert_eq!(values.len(), 2049);
}

#[test]
fn missing_file_is_not_found_with_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let codec = Codec::new(DirProvider::new(temp.path()));
    let err = codec.fetch("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.resource(), Some("missing"));
    assert!(err.path().expect("path").ends_with("missing.json"));
}

#[test]
fn unreadable_resource_is_io_with_source() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::create_dir(temp.path().join(format!("x.{RESOURCE_EXTENSION}"))).expect("dir");

    let codec = Codec::new(DirProvider::new(temp.path()));
    let err = codec.fetch("x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.resource(), Some("x"));
    assert!(err.path().expect("path").ends_with("x.json"));
    assert!(err.source().is_some());
}

#[test]
fn names_list_only_json_files_sorted() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("zeta.json"), b"{}").expect("zeta");
    fs::write(temp.path().join("alpha.json"), b"{}").expect("alpha");
    fs::write(temp.path().join("notes.txt"), b"skip").expect("txt");
    fs::create_dir(temp.path().join("dir.json")).expect("dir");

    let names = DirProvider::new(temp.path()).names().expect("names");
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn missing_directory_listing_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = DirProvider::new(temp.path().join("nope")).names().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn path_like_names_are_rejected_before_io() {
    let temp = tempfile::tempdir().expect("tempdir");
    let codec = Codec::new(DirProvider::new(temp.path()));
    for name in ["../etc/passwd", "a/b", ""] {
        let err = codec.fetch(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage, "name {name:?}");
    }
}

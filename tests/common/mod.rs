// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use artifact_resolver::db;
use artifact_resolver::ingest;
use artifact_resolver::record::ProviderKind;
use artifact_resolver::resolve::Params;
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

/// Raw current-provider record
///
/// `id` is padded to a 24 character object id; `release` empty means nightly.
pub fn girder_record(
    id: &str,
    revision: i64,
    os: &str,
    build_date: &str,
    release: &str,
    version: &str,
) -> Value {
    json!({
        "_id": format!("{id:0>24}"),
        "name": format!("Slicer-{version}-{os}-amd64"),
        "size": 123456789,
        "created": build_date,
        "folderId": "5f4474d0e1d8c75dfc705482",
        "meta": {
            "os": os,
            "arch": "amd64",
            "revision": revision.to_string(),
            "build_date": build_date,
            "release": release,
            "pre_release": false,
            "baseName": "Slicer",
            "version": version,
            "sha512": "cf83e1357eefb8bd"
        }
    })
}

/// Raw legacy-provider record with one bitstream
pub fn midas_record(item_id: i64, revision: i64, os: &str, checkout_date: &str, release: &str) -> Value {
    json!({
        "item_id": item_id.to_string(),
        "name": format!("Slicer-4.5.0-{checkout_date}-{os}-amd64"),
        "arch": "amd64",
        "revision": revision.to_string(),
        "os": os,
        "codebase": "Slicer4",
        "package": "installer",
        "date_creation": format!("{checkout_date} 06:00:00"),
        "checkoutdate": format!("{checkout_date} 00:00:00"),
        "productname": "Slicer",
        "release": release,
        "bitstreams": [{"bitstream_id": (item_id * 10).to_string(), "size": "1024", "md5": "d41d8cd9"}]
    })
}

/// A small release history across three operating systems
///
/// Revisions 30000 and 29000 are releases (5.2.1 and 5.0.3); the rest are
/// nightlies. Revision 30100 has two linux builds.
pub fn sample_girder_records() -> Vec<Value> {
    vec![
        girder_record("a1", 30100, "linux", "2024-03-02T04:00:00Z", "", "5.3.0"),
        girder_record("a2", 30100, "linux", "2024-03-01T04:00:00Z", "", "5.3.0"),
        girder_record("a3", 30100, "win", "2024-03-01T04:00:00Z", "", "5.3.0"),
        girder_record("b1", 30000, "linux", "2024-02-01T04:00:00Z", "5.2.1", "5.2.1"),
        girder_record("b2", 30000, "win", "2024-02-01T04:00:00Z", "5.2.1", "5.2.1"),
        girder_record("b3", 30000, "macosx", "2024-02-01T04:00:00Z", "5.2.1", "5.2.1"),
        girder_record("c1", 29500, "linux", "2023-12-01T04:00:00Z", "", "5.1.0"),
        girder_record("d1", 29000, "linux", "2023-06-01T04:00:00Z", "5.0.3", "5.0.3"),
    ]
}

/// Create a record database filled with `records`.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_record_db(records: &[Value], provider: ProviderKind) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("var").join("records.sqlite");

    db::init(&db_path).unwrap();
    let mut conn = db::open(&db_path).unwrap();
    ingest::upsert_records(&mut conn, records, provider).unwrap();

    (temp_dir, db_path)
}

/// Build request parameters from key/value pairs
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

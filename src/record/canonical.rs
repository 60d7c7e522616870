// src/record/canonical.rs

//! Canonicalization of raw provider records
//!
//! Maps each provider's field names onto [`CanonicalRecord`]. Fields a
//! provider does not supply (checkout date, codebase, package, MD5 for the
//! current provider) are represented as `None`, never dropped.

use super::raw::{GirderRecord, MidasRecord, value_as_bool, value_as_i64};
use super::version::extract_version;
use super::{CanonicalRecord, ItemId, OperatingSystem, ProviderKind};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Convert a raw provider record into a canonical record
///
/// Fails with [`Error::MalformedRecord`] when `os`, `revision` or the item
/// identifier is missing, or when `revision` is not an integer.
pub fn canonicalize(raw: &Value, provider: ProviderKind) -> Result<CanonicalRecord> {
    match provider {
        ProviderKind::Midas => {
            let record = MidasRecord::deserialize(raw)
                .map_err(|e| Error::MalformedRecord(format!("unreadable midas record: {e}")))?;
            from_midas(record)
        }
        ProviderKind::Girder => {
            let record = GirderRecord::deserialize(raw)
                .map_err(|e| Error::MalformedRecord(format!("unreadable girder record: {e}")))?;
            from_girder(record)
        }
    }
}

/// Parse JSON text and canonicalize it
pub fn canonicalize_json(json: &str, provider: ProviderKind) -> Result<CanonicalRecord> {
    let raw: Value = serde_json::from_str(json)
        .map_err(|e| Error::MalformedRecord(format!("invalid JSON: {e}")))?;
    canonicalize(&raw, provider)
}

fn require_os(os: Option<&str>) -> Result<OperatingSystem> {
    let os = os.ok_or_else(|| Error::MalformedRecord("missing os".to_string()))?;
    os.parse().map_err(Error::MalformedRecord)
}

fn require_revision(revision: Option<&Value>) -> Result<i64> {
    let revision =
        revision.ok_or_else(|| Error::MalformedRecord("missing revision".to_string()))?;
    value_as_i64(revision)
        .ok_or_else(|| Error::MalformedRecord(format!("non-numeric revision: {revision}")))
}

fn item_id_from_value(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(n) => n.as_i64().map(ItemId::Int),
        Value::String(s) if !s.is_empty() => Some(ItemId::Text(s.clone())),
        _ => None,
    }
}

fn from_midas(record: MidasRecord) -> Result<CanonicalRecord> {
    let os = require_os(record.os.as_deref())?;
    let revision = require_revision(record.revision.as_ref())?;

    let bitstream = record.bitstreams.first().ok_or_else(|| {
        Error::MalformedRecord(format!("revision {revision} has no bitstreams"))
    })?;
    let identifier = bitstream
        .bitstream_id
        .as_ref()
        .and_then(item_id_from_value)
        .ok_or_else(|| {
            Error::MalformedRecord(format!("revision {revision} has no bitstream id"))
        })?;

    let release_tag = record.release.unwrap_or_default();
    let name = record.name.unwrap_or_default();
    let version = extract_version(ProviderKind::Midas, &release_tag, &name);

    Ok(CanonicalRecord {
        provider: ProviderKind::Midas,
        identifier,
        os,
        arch: record.arch.unwrap_or_default(),
        revision,
        build_date: record.date_creation,
        checkout_date: record.checkoutdate,
        pre_release: record.pre_release.as_ref().is_some_and(value_as_bool),
        release_tag,
        version_label: name.clone(),
        version,
        name,
        product_name: record.productname,
        codebase: record.codebase,
        package: record.package,
        size: bitstream.size.as_ref().and_then(value_as_i64),
        md5: bitstream.md5.clone(),
        sha512: None,
    })
}

fn from_girder(record: GirderRecord) -> Result<CanonicalRecord> {
    let meta = record.meta;
    let os = require_os(meta.os.as_deref())?;
    let revision = require_revision(meta.revision.as_ref())?;

    let identifier = record
        .id
        .filter(|id| !id.is_empty())
        .map(ItemId::Text)
        .ok_or_else(|| Error::MalformedRecord(format!("revision {revision} has no _id")))?;

    let release_tag = meta.release.unwrap_or_default();
    let version_label = meta.version.unwrap_or_default();
    let version = extract_version(ProviderKind::Girder, &release_tag, &version_label);

    Ok(CanonicalRecord {
        provider: ProviderKind::Girder,
        identifier,
        os,
        arch: meta.arch.unwrap_or_default(),
        revision,
        build_date: meta.build_date,
        checkout_date: None,
        pre_release: meta.pre_release.as_ref().is_some_and(value_as_bool),
        release_tag,
        version_label,
        version,
        name: record.name.unwrap_or_default(),
        product_name: meta.base_name,
        codebase: None,
        package: None,
        size: record.size.as_ref().and_then(value_as_i64),
        md5: None,
        sha512: meta.sha512,
    })
}

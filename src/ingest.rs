// src/ingest.rs

//! Metadata ingest
//!
//! Loads raw provider records into the record store, removes rows by item
//! id, and finds application packages uploaded more than once.

use crate::db::{self, StoredRecord};
use crate::error::{Error, Result};
use crate::record::raw::value_as_i64;
use crate::record::{GirderRecord, ItemId, ProviderKind};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Length of a current-provider object id
pub const GIRDER_ID_LEN: usize = 24;

/// Outcome of [`upsert_records`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Raw records offered
    pub fetched: usize,
    /// Records without usable id or revision
    pub skipped: usize,
    /// Rows that did not exist before
    pub added: usize,
    /// Existing rows whose stored JSON changed
    pub updated: usize,
}

/// Outcome of [`remove_items`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<ItemId>,
    pub not_found: Vec<ItemId>,
}

/// Read a JSON array of raw provider records
pub fn read_records_file(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let records: Vec<Value> = serde_json::from_str(&text).map_err(|e| {
        Error::ParseError(format!("{}: expected a JSON array of records: {e}", path.display()))
    })?;
    debug!("Read {} raw records from {}", records.len(), path.display());
    Ok(records)
}

fn checksum(record: &str) -> String {
    hex::encode(Sha256::digest(record.as_bytes()))
}

fn record_checksums(conn: &Connection) -> Result<HashMap<ItemId, String>> {
    let mut stmt = conn.prepare("SELECT item_id, record FROM records")?;
    let rows = stmt.query_map([], |row| {
        let record: String = row.get(1)?;
        Ok((row.get::<_, ItemId>(0)?, checksum(&record)))
    })?;

    let mut checksums = HashMap::new();
    for row in rows {
        let (item_id, sum) = row?;
        checksums.insert(item_id, sum);
    }
    Ok(checksums)
}

/// Insert or replace every usable raw record in one transaction
///
/// Replacing a row always reports a change to SQLite, so added and updated
/// counts come from comparing content checksums taken before and after.
pub fn upsert_records(
    conn: &mut Connection,
    raws: &[Value],
    provider: ProviderKind,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary {
        fetched: raws.len(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(raws.len());
    for raw in raws {
        match StoredRecord::from_raw(raw, provider) {
            Ok(row) => rows.push(row),
            Err(Error::MalformedRecord(reason)) => {
                warn!("Skipping record: {}", reason);
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    db::transaction(conn, |tx| {
        let before = record_checksums(tx)?;

        for row in &rows {
            row.upsert(tx)?;
        }

        let after = record_checksums(tx)?;
        summary.added = after.len().saturating_sub(before.len());
        summary.updated = before
            .iter()
            .filter(|(item_id, sum)| after.get(*item_id).is_some_and(|new| new != *sum))
            .count();
        Ok(())
    })?;

    info!(
        "Ingested {} records: {} added, {} updated, {} skipped",
        summary.fetched, summary.added, summary.updated, summary.skipped
    );
    Ok(summary)
}

/// Parse an item id given on the command line
pub fn validate_item_id(provider: ProviderKind, text: &str) -> Result<ItemId> {
    let text = text.trim();
    match provider {
        ProviderKind::Girder => {
            if text.len() != GIRDER_ID_LEN {
                return Err(Error::InvalidCriteria(format!(
                    "item id \"{text}\" is expected to be {GIRDER_ID_LEN} characters"
                )));
            }
            Ok(ItemId::Text(text.to_string()))
        }
        ProviderKind::Midas => text.parse::<i64>().map(ItemId::Int).map_err(|_| {
            Error::InvalidCriteria(format!("item id \"{text}\" is expected to be an integer"))
        }),
    }
}

/// Parse a comma separated list of item ids, dropping duplicates
pub fn parse_item_ids(provider: ProviderKind, list: &str) -> Result<Vec<ItemId>> {
    let ids = list
        .split(',')
        .filter(|id| !id.trim().is_empty())
        .map(|id| validate_item_id(provider, id))
        .collect::<Result<BTreeSet<_>>>()?;
    Ok(ids.into_iter().collect())
}

/// Delete the rows for `item_ids` in one transaction
pub fn remove_items(conn: &mut Connection, item_ids: &[ItemId]) -> Result<RemovalReport> {
    let report = db::transaction(conn, |tx| {
        let mut report = RemovalReport::default();
        for item_id in item_ids {
            if StoredRecord::delete(tx, item_id)? {
                report.removed.push(item_id.clone());
            } else {
                report.not_found.push(item_id.clone());
            }
        }
        Ok(report)
    })?;

    info!(
        "Removed {} rows ({} not found)",
        report.removed.len(),
        report.not_found.len()
    );
    Ok(report)
}

/// Raw records of every stored row
pub fn stored_records(conn: &Connection) -> Result<Vec<Value>> {
    StoredRecord::list_ordered(conn)?
        .iter()
        .map(StoredRecord::raw)
        .collect()
}

/// Item and folder of one uploaded package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub item_id: String,
    pub folder_id: Option<String>,
}

/// Packages keyed by `<revision>-<os>-<arch>`
pub type PackageIndex = BTreeMap<String, Vec<PackageItem>>;

/// Group current-provider records by the package they describe
///
/// Records missing any part of the key are left out.
pub fn package_index(raws: &[Value]) -> PackageIndex {
    let mut index = PackageIndex::new();

    for raw in raws {
        let Ok(item) = GirderRecord::deserialize(raw) else {
            warn!("Skipping unreadable record while indexing packages");
            continue;
        };
        let (Some(item_id), Some(revision), Some(os), Some(arch)) = (
            item.id,
            item.meta.revision.as_ref().and_then(value_as_i64),
            item.meta.os,
            item.meta.arch,
        ) else {
            continue;
        };

        index
            .entry(format!("{revision}-{os}-{arch}"))
            .or_default()
            .push(PackageItem {
                item_id,
                folder_id: item.folder_id,
            });
    }

    index
}

/// Packages uploaded more than once
pub fn duplicate_packages(index: &PackageIndex) -> PackageIndex {
    index
        .iter()
        .filter(|(_, items)| items.len() > 1)
        .map(|(key, items)| (key.clone(), items.clone()))
        .collect()
}

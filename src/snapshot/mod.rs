// src/snapshot/mod.rs

//! Record snapshots
//!
//! A [`Snapshot`] is an immutable, revision-descending sequence of canonical
//! records for one resolution call or many concurrent ones. The
//! [`SnapshotStore`] owns the current snapshot for a record database and
//! swaps in a rebuilt one when the store looks stale.
//!
//! Staleness is judged by row count only: an upstream update that rewrites
//! existing rows without changing how many there are is not picked up until
//! the count changes or [`SnapshotStore::refresh`] is called.

use crate::db::{self, StoredRecord};
use crate::error::Result;
use crate::record::{CanonicalRecord, ProviderKind, canonicalize};
use crate::resolve::{self, Criteria, Params, ResolvedRecord, SweepCriteria, SweepResult};
use parking_lot::RwLock;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable ordered collection of canonical records
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    provider: ProviderKind,
    records: Vec<CanonicalRecord>,
    /// Stored rows the snapshot was built from, including skipped ones
    source_rows: usize,
}

impl Snapshot {
    /// Wrap records that are already in snapshot order
    pub fn new(provider: ProviderKind, records: Vec<CanonicalRecord>) -> Self {
        let source_rows = records.len();
        Self {
            provider,
            records,
            source_rows,
        }
    }

    /// Sort records into snapshot order and wrap them
    ///
    /// Revision descending, then build date descending with missing dates
    /// last. The sort is stable, so remaining ties keep their input order.
    pub fn ordered(provider: ProviderKind, mut records: Vec<CanonicalRecord>) -> Self {
        records.sort_by(|a, b| {
            b.revision
                .cmp(&a.revision)
                .then_with(|| b.build_date.cmp(&a.build_date))
        });
        Self::new(provider, records)
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    /// See [`resolve::resolve`]
    pub fn resolve(&self, criteria: &Criteria) -> Result<&CanonicalRecord> {
        resolve::resolve(&self.records, criteria)
    }

    /// Validate request parameters and resolve a single record
    pub fn find(&self, params: &Params) -> Result<ResolvedRecord> {
        let criteria = Criteria::from_params(params, self.provider)?;
        resolve::find(&self.records, &criteria)
    }

    /// Validate request parameters and resolve every OS/stability cell
    pub fn find_all(&self, params: &Params) -> Result<SweepResult> {
        let sweep = SweepCriteria::from_params(params, self.provider)?;
        resolve::resolve_all(&self.records, &sweep)
    }
}

/// Build a snapshot from every stored row
///
/// Rows that fail to canonicalize are skipped with a warning; they still
/// count toward [`Snapshot::source_rows`].
pub fn load_snapshot(conn: &Connection, provider: ProviderKind) -> Result<Snapshot> {
    let rows = StoredRecord::list_ordered(conn)?;
    let source_rows = rows.len();

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let canonical = row.raw().and_then(|raw| canonicalize(&raw, provider));
        match canonical {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping stored item {}: {}", row.item_id, e),
        }
    }

    debug!(
        "Loaded {} of {} stored records for provider {}",
        records.len(),
        source_rows,
        provider
    );

    Ok(Snapshot {
        provider,
        records,
        source_rows,
    })
}

/// Owner of the current snapshot for one record database
///
/// Readers get an `Arc` to the snapshot that was current when they asked;
/// a refresh builds a new snapshot and swaps it in without touching the
/// one readers hold.
pub struct SnapshotStore {
    db_path: PathBuf,
    provider: ProviderKind,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new(db_path: impl Into<PathBuf>, provider: ProviderKind) -> Self {
        Self {
            db_path: db_path.into(),
            provider,
            current: RwLock::new(None),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Current snapshot without checking the database
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Current snapshot, rebuilt first if the stored row count changed
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let conn = db::open(&self.db_path)?;
        let rows = StoredRecord::count(&conn)?;

        if let Some(current) = self.current.read().as_ref()
            && current.source_rows() == rows
        {
            return Ok(Arc::clone(current));
        }

        self.rebuild(&conn)
    }

    /// Rebuild unconditionally
    pub fn refresh(&self) -> Result<Arc<Snapshot>> {
        let conn = db::open(&self.db_path)?;
        self.rebuild(&conn)
    }

    fn rebuild(&self, conn: &Connection) -> Result<Arc<Snapshot>> {
        let snapshot = Arc::new(load_snapshot(conn, self.provider)?);

        let mut current = self.current.write();
        let previous_rows = current.as_ref().map(|s| s.source_rows());
        info!(
            "Refreshed snapshot from {}: {:?} -> {} rows",
            self.db_path.display(),
            previous_rows,
            snapshot.source_rows()
        );
        *current = Some(Arc::clone(&snapshot));

        Ok(snapshot)
    }
}

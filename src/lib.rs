// src/lib.rs

//! Artifact Resolver
//!
//! Answers "which build of the application should this download request
//! get?" from a snapshot of stored release and nightly build records.
//!
//! # Architecture
//!
//! - Raw records from either backend provider are stored as JSON in SQLite
//! - Snapshots: canonicalized, revision-ordered records rebuilt when the store changes
//! - Criteria: request parameters validated into one OS, stability, and selection mode
//! - Predicates: composable record filters, first match in snapshot order wins
//! - Offsets: step across revision groups from the matched record

pub mod config;
pub mod db;
mod error;
pub mod ingest;
pub mod record;
pub mod resolve;
pub mod snapshot;

pub use error::{Error, ErrorClass, Result};
pub use record::{CanonicalRecord, OperatingSystem, ProviderKind};
pub use resolve::{Criteria, Mode, Params, ResolvedRecord, Stability};
pub use snapshot::{Snapshot, SnapshotStore, load_snapshot};

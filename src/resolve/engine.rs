// src/resolve/engine.rs

//! Resolution engine
//!
//! Maps validated criteria onto exactly one record of a snapshot. The
//! snapshot must already be ordered by revision descending, then build date
//! descending; the engine relies on that order and never re-sorts.
//!
//! Resolution is a single pass:
//! 1. keep the records of the requested operating system, in order;
//! 2. find the first one passing the stability and mode predicates;
//! 3. optionally step `offset` revision groups away from that match.
//!
//! A revision group is a maximal run of adjacent records sharing a revision.
//! Negative offsets walk toward older revisions and pick the first record of
//! the target group. Positive offsets walk back toward newer revisions and
//! pick the most recent build of the target group. Group 0 is the group the
//! walk starts in, so `-1` and `+1` land on the neighbouring revisions.

use super::criteria::{Criteria, Stability, SweepCriteria};
use super::output::ResolvedRecord;
use super::predicate::{MatchOs, Predicate, build_predicates};
use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, OperatingSystem};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Sweep results keyed by operating system, then stability
pub type SweepResult = BTreeMap<OperatingSystem, BTreeMap<Stability, Option<ResolvedRecord>>>;

const NO_MATCH: &str = "no matching revision for given parameters";

/// Resolve `criteria` against an ordered record sequence
///
/// Fails with [`Error::InvalidCriteria`] when the mode value does not parse
/// and with [`Error::NotFoundError`] when nothing matches or the offset
/// steps past the available revision groups.
pub fn resolve<'a>(records: &'a [CanonicalRecord], criteria: &Criteria) -> Result<&'a CanonicalRecord> {
    let matcher = build_predicates(criteria)?;

    let os_filter = MatchOs(criteria.os);
    let os_records: Vec<&CanonicalRecord> = records.iter().filter(|r| os_filter.test(r)).collect();

    let Some(index) = os_records.iter().position(|r| matcher.test(r)) else {
        debug!(
            "No {} record matches {} {:?} ({} candidates)",
            criteria.os,
            criteria.mode,
            criteria.mode_value,
            os_records.len()
        );
        return Err(Error::NotFoundError(NO_MATCH.to_string()));
    };

    debug!(
        "Matched revision {} at index {} for {} {:?}",
        os_records[index].revision, index, criteria.mode, criteria.mode_value
    );

    step_by_offset(&os_records, index, criteria.offset)
        .ok_or_else(|| Error::NotFoundError(NO_MATCH.to_string()))
}

/// Step `offset` revision groups away from `os_records[index]`
fn step_by_offset<'a>(
    os_records: &[&'a CanonicalRecord],
    index: usize,
    offset: i64,
) -> Option<&'a CanonicalRecord> {
    let steps = usize::try_from(offset.unsigned_abs()).unwrap_or(usize::MAX);
    let same_revision = |a: &&CanonicalRecord, b: &&CanonicalRecord| a.revision == b.revision;

    let selected = match offset.cmp(&0) {
        Ordering::Equal => Some(os_records[index]),
        // Forward through the list, toward older revisions
        Ordering::Less => os_records[index..]
            .chunk_by(same_revision)
            .nth(steps)
            .and_then(|group| group.first().copied()),
        // Backward through the list, toward newer revisions, stopping short of
        // the newest record. Walking the groups from the back, the last record
        // visited in a group is its first in list order.
        Ordering::Greater => os_records
            .get(1..=index)
            .unwrap_or_default()
            .chunk_by(same_revision)
            .rev()
            .nth(steps)
            .and_then(|group| group.first().copied()),
    };

    match selected {
        Some(record) => debug!("Offset {} selected revision {}", offset, record.revision),
        None => debug!("Offset {} stepped past the available revisions", offset),
    }
    selected
}

/// Resolve and project into a [`ResolvedRecord`]
pub fn find(records: &[CanonicalRecord], criteria: &Criteria) -> Result<ResolvedRecord> {
    resolve(records, criteria).map(ResolvedRecord::from)
}

/// Resolve every operating system and stability cell of a sweep
///
/// A cell without a match is `None`. Invalid mode values fail the whole
/// sweep.
pub fn resolve_all(records: &[CanonicalRecord], sweep: &SweepCriteria) -> Result<SweepResult> {
    let mut results = SweepResult::new();

    for &os in &sweep.oses {
        let mut by_stability = BTreeMap::new();
        for &stability in &sweep.stabilities {
            let cell = match find(records, &sweep.cell(os, stability)) {
                Ok(record) => Some(record),
                Err(Error::NotFoundError(_)) => None,
                Err(e) => return Err(e),
            };
            by_stability.insert(stability, cell);
        }
        results.insert(os, by_stability);
    }

    Ok(results)
}

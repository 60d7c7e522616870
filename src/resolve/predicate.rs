// src/resolve/predicate.rs

//! Record predicates
//!
//! Each filter criterion compiles into a small named predicate. Predicates
//! are combined with [`AllPass`], which evaluates them in order and stops at
//! the first failure.

use super::criteria::{Criteria, Mode, Stability};
use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, OperatingSystem, SubmissionType};

/// Boolean test over a canonical record
pub trait Predicate {
    fn test(&self, record: &CanonicalRecord) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&CanonicalRecord) -> bool,
{
    fn test(&self, record: &CanonicalRecord) -> bool {
        self(record)
    }
}

/// Record targets the given operating system
#[derive(Debug, Clone, Copy)]
pub struct MatchOs(pub OperatingSystem);

impl Predicate for MatchOs {
    fn test(&self, record: &CanonicalRecord) -> bool {
        record.os == self.0
    }
}

/// Record belongs to the given stability channel
///
/// A release must be tagged and not flagged as a pre-release.
#[derive(Debug, Clone, Copy)]
pub struct MatchStability(pub Stability);

impl Predicate for MatchStability {
    fn test(&self, record: &CanonicalRecord) -> bool {
        match self.0 {
            Stability::Nightly => record.submission_type() == SubmissionType::Nightly,
            Stability::Release => record.is_final_release(),
            Stability::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchExactRevision(pub i64);

impl Predicate for MatchExactRevision {
    fn test(&self, record: &CanonicalRecord) -> bool {
        record.revision == self.0
    }
}

/// Record revision does not exceed the ceiling
///
/// In a revision-descending snapshot the first hit is the nearest revision
/// at or below the ceiling.
#[derive(Debug, Clone, Copy)]
pub struct MatchClosestRevision(pub i64);

impl Predicate for MatchClosestRevision {
    fn test(&self, record: &CanonicalRecord) -> bool {
        self.0 >= record.revision
    }
}

/// Which record timestamp a [`MatchDate`] looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Build,
    Checkout,
}

/// Record date is on or before the requested date
///
/// Compares the date portion as text, which orders correctly for
/// `YYYY-MM-DD` prefixed values. A record without the field never matches.
#[derive(Debug, Clone)]
pub struct MatchDate {
    date: String,
    field: DateField,
}

impl MatchDate {
    pub fn new(date: impl Into<String>, field: DateField) -> Self {
        Self {
            date: date.into(),
            field,
        }
    }
}

impl Predicate for MatchDate {
    fn test(&self, record: &CanonicalRecord) -> bool {
        let value = match self.field {
            DateField::Build => record.build_date.as_deref(),
            DateField::Checkout => record.checkout_date.as_deref(),
        };
        match value {
            Some(value) if !value.is_empty() => self.date.as_str() >= date_portion(value),
            _ => false,
        }
    }
}

/// Record version agrees with every requested dot-separated segment
///
/// `4.5` matches `4.5.0` and `4.5.1` but not `4.6.0`. A record without a
/// version, or with fewer segments than requested, never matches.
#[derive(Debug, Clone)]
pub struct MatchVersion {
    segments: Vec<String>,
}

impl MatchVersion {
    pub fn new(version: &str) -> Self {
        Self {
            segments: version.split('.').map(str::to_string).collect(),
        }
    }
}

impl Predicate for MatchVersion {
    fn test(&self, record: &CanonicalRecord) -> bool {
        let Some(version) = record.version.as_deref() else {
            return false;
        };
        let mut record_segments = version.split('.');
        self.segments
            .iter()
            .all(|wanted| record_segments.next() == Some(wanted.as_str()))
    }
}

/// Conjunction of predicates, short-circuiting on the first failure
#[derive(Default)]
pub struct AllPass {
    predicates: Vec<Box<dyn Predicate + Send + Sync>>,
}

impl AllPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: impl Predicate + Send + Sync + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Predicate for AllPass {
    fn test(&self, record: &CanonicalRecord) -> bool {
        self.predicates.iter().all(|p| p.test(record))
    }
}

impl std::fmt::Debug for AllPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllPass")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Date part of a timestamp: everything before a space or `T` separator
pub fn date_portion(timestamp: &str) -> &str {
    timestamp
        .split([' ', 'T'])
        .next()
        .unwrap_or(timestamp)
}

fn parse_revision(value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        Error::InvalidCriteria(format!(
            "bad revision \"{value}\": should be specified as an integer"
        ))
    })
}

/// Compile the stability and mode predicates for `criteria`
///
/// The operating system filter is applied separately by the engine before
/// matching. Fails with [`Error::InvalidCriteria`] when the mode value does
/// not parse for its mode.
pub fn build_predicates(criteria: &Criteria) -> Result<AllPass> {
    let matcher = AllPass::new().with(MatchStability(criteria.stability));
    let value = criteria.mode_value.as_str();

    let matcher = match criteria.mode {
        Mode::Version => matcher.with(MatchVersion::new(value)),
        Mode::Revision => matcher.with(MatchExactRevision(parse_revision(value)?)),
        Mode::ClosestRevision => matcher.with(MatchClosestRevision(parse_revision(value)?)),
        Mode::Date => matcher.with(MatchDate::new(value, DateField::Build)),
        Mode::CheckoutDate => matcher.with(MatchDate::new(value, DateField::Checkout)),
    };

    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ItemId, ProviderKind};

    fn record(revision: i64, release: &str, version: Option<&str>) -> CanonicalRecord {
        CanonicalRecord {
            provider: ProviderKind::Girder,
            identifier: ItemId::Text(format!("id-{revision}")),
            os: OperatingSystem::Linux,
            arch: "amd64".to_string(),
            revision,
            build_date: Some("2024-03-01T10:00:00Z".to_string()),
            checkout_date: None,
            release_tag: release.to_string(),
            pre_release: false,
            version_label: String::new(),
            version: version.map(str::to_string),
            name: "Slicer".to_string(),
            product_name: None,
            codebase: None,
            package: None,
            size: None,
            md5: None,
            sha512: None,
        }
    }

    #[test]
    fn test_match_os() {
        let r = record(1, "", None);
        assert!(MatchOs(OperatingSystem::Linux).test(&r));
        assert!(!MatchOs(OperatingSystem::Win).test(&r));
    }

    #[test]
    fn test_match_stability() {
        let nightly = record(1, "", None);
        let release = record(2, "5.0.0", None);
        let mut pre = record(3, "5.1.0-rc1", None);
        pre.pre_release = true;

        assert!(MatchStability(Stability::Nightly).test(&nightly));
        assert!(!MatchStability(Stability::Nightly).test(&release));
        assert!(!MatchStability(Stability::Nightly).test(&pre));

        assert!(MatchStability(Stability::Release).test(&release));
        assert!(!MatchStability(Stability::Release).test(&nightly));
        assert!(!MatchStability(Stability::Release).test(&pre));

        for r in [&nightly, &release, &pre] {
            assert!(MatchStability(Stability::Any).test(r));
        }
    }

    #[test]
    fn test_revision_predicates() {
        let r = record(100, "", None);
        assert!(MatchExactRevision(100).test(&r));
        assert!(!MatchExactRevision(99).test(&r));
        assert!(MatchClosestRevision(100).test(&r));
        assert!(MatchClosestRevision(150).test(&r));
        assert!(!MatchClosestRevision(99).test(&r));
    }

    #[test]
    fn test_match_date_strips_time() {
        let r = record(1, "", None);
        assert!(MatchDate::new("2024-03-01", DateField::Build).test(&r));
        assert!(MatchDate::new("9999-12-31", DateField::Build).test(&r));
        assert!(!MatchDate::new("2024-02-29", DateField::Build).test(&r));
    }

    #[test]
    fn test_match_date_missing_field() {
        let r = record(1, "", None);
        assert!(!MatchDate::new("9999-12-31", DateField::Checkout).test(&r));

        let mut r = record(1, "", None);
        r.checkout_date = Some("2024-01-05 12:00:00".to_string());
        assert!(MatchDate::new("2024-01-05", DateField::Checkout).test(&r));
        assert!(!MatchDate::new("2024-01-04", DateField::Checkout).test(&r));
    }

    #[test]
    fn test_match_version_partial() {
        let wanted = MatchVersion::new("4.5");
        assert!(wanted.test(&record(1, "", Some("4.5.0"))));
        assert!(wanted.test(&record(1, "", Some("4.5.1"))));
        assert!(wanted.test(&record(1, "", Some("4.5"))));
        assert!(!wanted.test(&record(1, "", Some("4.6.0"))));
        assert!(!wanted.test(&record(1, "", Some("4.55.0"))));
        assert!(!wanted.test(&record(1, "", Some("4"))));
        assert!(!wanted.test(&record(1, "", None)));
    }

    #[test]
    fn test_match_version_exact_segments() {
        let wanted = MatchVersion::new("4.5.0");
        assert!(wanted.test(&record(1, "", Some("4.5.0"))));
        assert!(!wanted.test(&record(1, "", Some("4.5.0-rc2"))));
    }

    #[test]
    fn test_all_pass_short_circuits() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let matcher = AllPass::new()
            .with(|_: &CanonicalRecord| false)
            .with(move |_: &CanonicalRecord| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            });

        assert!(!matcher.test(&record(1, "", None)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(AllPass::new().test(&record(1, "", None)));
    }

    #[test]
    fn test_build_predicates_rejects_bad_revision() {
        let criteria = Criteria::new(OperatingSystem::Linux, Mode::Revision, "abc");
        let err = build_predicates(&criteria).unwrap_err();
        assert!(matches!(err, Error::InvalidCriteria(_)));

        let criteria = Criteria::new(OperatingSystem::Linux, Mode::ClosestRevision, "12.5");
        assert!(build_predicates(&criteria).is_err());
    }

    #[test]
    fn test_build_predicates_composition() {
        let criteria = Criteria::new(OperatingSystem::Linux, Mode::Revision, "100");
        let matcher = build_predicates(&criteria).unwrap();
        assert_eq!(matcher.len(), 2);
        assert!(matcher.test(&record(100, "", None)));
        assert!(!matcher.test(&record(101, "", None)));

        let criteria = Criteria::new(OperatingSystem::Linux, Mode::Version, "5.0")
            .with_stability(Stability::Release);
        let matcher = build_predicates(&criteria).unwrap();
        assert!(matcher.test(&record(100, "5.0.2", Some("5.0.2"))));
        assert!(!matcher.test(&record(100, "", Some("5.0.2"))));
    }

    #[test]
    fn test_date_portion() {
        assert_eq!(date_portion("2024-03-01 10:00:00"), "2024-03-01");
        assert_eq!(date_portion("2024-03-01T10:00:00Z"), "2024-03-01");
        assert_eq!(date_portion("2024-03-01"), "2024-03-01");
    }
}

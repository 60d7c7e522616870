// src/resolve/mod.rs

//! Record resolution
//!
//! This module provides:
//! - Request criteria parsing and validation
//! - Composable record predicates
//! - The resolution engine, including offset stepping across revision groups
//! - The resolved record projection returned to callers

mod criteria;
mod engine;
mod output;
mod predicate;

pub use criteria::{Criteria, DISTANT_DATE, Mode, Params, Stability, SweepCriteria, mode_from_params};
pub use engine::{SweepResult, find, resolve, resolve_all};
pub use output::{ResolvedRecord, short_date};
pub use predicate::{
    AllPass, DateField, MatchClosestRevision, MatchDate, MatchExactRevision, MatchOs,
    MatchStability, MatchVersion, Predicate, build_predicates, date_portion,
};

// src/resolve/output.rs

//! Resolved record projection handed to transport layers

use super::predicate::date_portion;
use crate::record::{CanonicalRecord, OperatingSystem};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Timestamp layouts seen in provider records, without offset
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A matched record with derived download reference and short dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub arch: String,
    pub revision: i64,
    pub os: OperatingSystem,
    pub codebase: Option<String>,
    pub name: String,
    pub package: Option<String>,
    pub build_date: Option<String>,
    pub build_date_ymd: Option<String>,
    pub checkout_date: Option<String>,
    pub checkout_date_ymd: Option<String>,
    pub product_name: Option<String>,
    /// `release` or `nightly`
    pub stability: String,
    pub size: Option<i64>,
    pub md5: Option<String>,
    pub sha512: Option<String>,
    pub version: Option<String>,
    /// `/bitstream/<identifier>`
    pub download_url: String,
}

impl From<&CanonicalRecord> for ResolvedRecord {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            arch: record.arch.clone(),
            revision: record.revision,
            os: record.os,
            codebase: record.codebase.clone(),
            name: record.name.clone(),
            package: record.package.clone(),
            build_date: record.build_date.clone(),
            build_date_ymd: record.build_date.as_deref().map(short_date),
            checkout_date: record.checkout_date.clone(),
            checkout_date_ymd: record.checkout_date.as_deref().map(short_date),
            product_name: record.product_name.clone(),
            stability: record.submission_type().as_str().to_string(),
            size: record.size,
            md5: record.md5.clone(),
            sha512: record.sha512.clone(),
            version: record.version.clone(),
            download_url: record.download_url(),
        }
    }
}

/// `YYYY-MM-DD` projection of a timestamp
///
/// Timestamps with an offset keep the calendar date of that offset.
/// Unparseable text falls back to its leading date portion.
pub fn short_date(timestamp: &str) -> String {
    let trimmed = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return dt.date().format("%Y-%m-%d").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    date_portion(trimmed).to_string()
}

// src/record/mod.rs

//! Canonical build artifact records
//!
//! Release metadata arrives from two backend providers with unrelated field
//! layouts. Everything downstream of ingest works on [`CanonicalRecord`], a
//! provider-independent value built once per snapshot and never mutated.

mod canonical;
pub(crate) mod raw;
mod version;

pub use canonical::{canonicalize, canonicalize_json};
pub use raw::{GirderMeta, GirderRecord, MidasBitstream, MidasRecord};
pub use version::{extract_version, version_from_label};

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Operating systems a build can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    MacOsX,
    Win,
    Linux,
}

impl OperatingSystem {
    /// All supported values, in presentation order
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::MacOsX,
        OperatingSystem::Win,
        OperatingSystem::Linux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::MacOsX => "macosx",
            OperatingSystem::Win => "win",
            OperatingSystem::Linux => "linux",
        }
    }

    /// Supported values joined for error messages
    pub fn choices() -> String {
        Self::ALL
            .iter()
            .map(|os| os.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "macosx" => Ok(OperatingSystem::MacOsX),
            "win" => Ok(OperatingSystem::Win),
            "linux" => Ok(OperatingSystem::Linux),
            _ => Err(format!(
                "unknown os \"{s}\": should be one of ({})",
                Self::choices()
            )),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend provider a raw record was fetched from
///
/// Field layout, identifier type, version source, and supported selection
/// modes all depend on the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// Legacy provider: flat records with bitstream lists
    Midas,
    /// Current provider: item records with a `meta` block
    #[default]
    Girder,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Midas => "midas",
            ProviderKind::Girder => "girder",
        }
    }

    /// Whether records from this provider carry a checkout date
    pub fn supports_checkout_date(&self) -> bool {
        matches!(self, ProviderKind::Midas)
    }

    /// Default base URL of the upstream download endpoint
    pub fn default_source_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Midas => "https://slicer.kitware.com/midas3",
            ProviderKind::Girder => "https://slicer-packages.kitware.com/api/v1",
        }
    }

    /// Upstream URL that a local `/bitstream/<identifier>` reference redirects to
    pub fn source_download_url(&self, base_url: Option<&str>, identifier: &str) -> String {
        let base = base_url
            .unwrap_or_else(|| self.default_source_base_url())
            .trim_end_matches('/');
        match self {
            ProviderKind::Midas => format!("{base}/download?bitstream={identifier}"),
            ProviderKind::Girder => format!("{base}/item/{identifier}/download"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "midas" | "midas_v1" => Ok(ProviderKind::Midas),
            "girder" | "girder_v1" => Ok(ProviderKind::Girder),
            _ => Err(format!("Invalid provider kind: {s}")),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a build is a tagged release or a nightly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionType {
    Release,
    Nightly,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Release => "release",
            SubmissionType::Nightly => "nightly",
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider handle of a stored item
///
/// The legacy provider uses integer ids, the current one uses 24 character
/// object ids. The engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{id}"),
            ItemId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl ToSql for ItemId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            ItemId::Int(id) => id.to_sql(),
            ItemId::Text(id) => id.to_sql(),
        }
    }
}

impl FromSql for ItemId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(id) => Ok(ItemId::Int(id)),
            ValueRef::Text(text) => std::str::from_utf8(text)
                .map(|id| ItemId::Text(id.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Provider-independent representation of one build artifact
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub provider: ProviderKind,
    /// Handle used to build the download reference
    pub identifier: ItemId,
    pub os: OperatingSystem,
    pub arch: String,
    pub revision: i64,
    /// Build timestamp as provided (ISO-like, may carry a time of day)
    pub build_date: Option<String>,
    /// Source checkout timestamp, absent for providers that lack it
    pub checkout_date: Option<String>,
    /// Non-empty for tagged release builds
    pub release_tag: String,
    pub pre_release: bool,
    /// Text the version is derived from when there is no release tag
    pub version_label: String,
    /// Derived by [`extract_version`]
    pub version: Option<String>,
    pub name: String,
    pub product_name: Option<String>,
    pub codebase: Option<String>,
    pub package: Option<String>,
    pub size: Option<i64>,
    pub md5: Option<String>,
    pub sha512: Option<String>,
}

impl CanonicalRecord {
    pub fn submission_type(&self) -> SubmissionType {
        if self.release_tag.is_empty() {
            SubmissionType::Nightly
        } else {
            SubmissionType::Release
        }
    }

    /// Tagged and final
    pub fn is_final_release(&self) -> bool {
        !self.release_tag.is_empty() && !self.pre_release
    }

    /// Local download reference, redirected to the provider by the server
    pub fn download_url(&self) -> String {
        format!("{}/{}", LOCAL_BITSTREAM_PATH, self.identifier)
    }
}

/// Path prefix of local download references
pub const LOCAL_BITSTREAM_PATH: &str = "/bitstream";

/// Interpret loosely typed boolean text
pub fn parse_bool(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operating_system_round_trip() {
        for os in OperatingSystem::ALL {
            assert_eq!(os.as_str().parse::<OperatingSystem>().unwrap(), os);
        }
    }

    #[test]
    fn test_unknown_operating_system_message() {
        let err = "bsd".parse::<OperatingSystem>().unwrap_err();
        assert_eq!(
            err,
            "unknown os \"bsd\": should be one of (macosx, win, linux)"
        );
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("midas".parse::<ProviderKind>().unwrap(), ProviderKind::Midas);
        assert_eq!("Girder_v1".parse::<ProviderKind>().unwrap(), ProviderKind::Girder);
        assert!("gitlab".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::default(), ProviderKind::Girder);
    }

    #[test]
    fn test_source_download_url() {
        assert_eq!(
            ProviderKind::Midas.source_download_url(None, "12345"),
            "https://slicer.kitware.com/midas3/download?bitstream=12345"
        );
        assert_eq!(
            ProviderKind::Girder.source_download_url(None, "60add706ae4540bf6a89bf98"),
            "https://slicer-packages.kitware.com/api/v1/item/60add706ae4540bf6a89bf98/download"
        );
        assert_eq!(
            ProviderKind::Girder.source_download_url(Some("http://mirror.local/api/"), "abc"),
            "http://mirror.local/api/item/abc/download"
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("True"));
        assert!(parse_bool(" yes "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("False"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId::Int(42).to_string(), "42");
        assert_eq!(ItemId::Text("abc".to_string()).to_string(), "abc");
    }
}

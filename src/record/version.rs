// src/record/version.rs

//! Version extraction from package names
//!
//! A release tag always wins. Without one, the version is pulled out of a
//! provider-specific label with two patterns tried in order. The version
//! token admits digits, dots, hyphens and lowercase letters so that forms
//! like `4.5.0-1`, `4.5.0-rc2` or `4.5.0-gamma` survive.

use super::ProviderKind;
use regex::Regex;
use std::sync::LazyLock;

/// `<name>-<version>-<YYYY-MM-DD>`
///
/// Name characters span ASCII `A` through `z`, punctuation between the cases included.
static NAME_VERSION_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_\[\\\]^`]+-([-\d.a-z]+)-(\d{4}-\d{2}-\d{2})").unwrap()
});

/// `<name>-<version>-<os>`
static NAME_VERSION_OS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_\[\\\]^`]+-([-\d.a-z]+)-(macosx|linux|win)").unwrap()
});

/// `<version>-<YYYY-MM-DD>`
static VERSION_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-\d.a-z]+)-(\d{4}-\d{2}-\d{2})").unwrap());

/// Strict `X.Y.Z`
static VERSION_XYZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+\.\d+)$").unwrap());

/// Derive the version of a build
///
/// Returns `release_tag` verbatim when it is non-empty. Otherwise `label`
/// (the package name for [`ProviderKind::Midas`], the `meta.version` field
/// for [`ProviderKind::Girder`]) is matched against the provider's patterns.
pub fn extract_version(provider: ProviderKind, release_tag: &str, label: &str) -> Option<String> {
    if !release_tag.is_empty() {
        return Some(release_tag.to_string());
    }
    version_from_label(provider, label)
}

/// Pattern-based half of [`extract_version`]
pub fn version_from_label(provider: ProviderKind, label: &str) -> Option<String> {
    let patterns: [&Regex; 2] = match provider {
        ProviderKind::Midas => [&NAME_VERSION_DATE_RE, &NAME_VERSION_OS_RE],
        ProviderKind::Girder => [&VERSION_DATE_RE, &VERSION_XYZ_RE],
    };

    patterns
        .iter()
        .find_map(|re| re.captures(label))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

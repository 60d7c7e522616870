// src/resolve/criteria.rs

//! Request criteria
//!
//! A request names an operating system, a stability channel, at most one
//! selection mode parameter and an offset. [`Criteria::from_params`] turns the
//! raw parameter map into a validated value and reports every malformed or
//! ambiguous input as [`Error::InvalidCriteria`].

use crate::error::{Error, Result};
use crate::record::{OperatingSystem, ProviderKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw request parameters, keyed by parameter name
pub type Params = BTreeMap<String, String>;

/// Date used when no mode parameter is given; later than every real build
pub const DISTANT_DATE: &str = "9999-12-31";

/// Coarse maturity filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Release,
    Nightly,
    Any,
}

impl Stability {
    pub const ALL: [Stability; 3] = [Stability::Release, Stability::Nightly, Stability::Any];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Release => "release",
            Stability::Nightly => "nightly",
            Stability::Any => "any",
        }
    }

    /// Stability assumed when the request does not name one
    pub fn default_for(mode: Mode) -> Self {
        match mode {
            Mode::Revision => Stability::Any,
            _ => Stability::Release,
        }
    }

    pub fn choices() -> String {
        join_choices(Self::ALL.iter().map(|s| s.as_str()))
    }
}

impl FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "release" => Ok(Stability::Release),
            "nightly" => Ok(Stability::Nightly),
            "any" => Ok(Stability::Any),
            _ => Err(format!(
                "bad stability {s}: should be one of ({})",
                Self::choices()
            )),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Primary selection strategy, named after its request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Revision,
    ClosestRevision,
    Version,
    CheckoutDate,
    Date,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Revision,
        Mode::ClosestRevision,
        Mode::Version,
        Mode::CheckoutDate,
        Mode::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Revision => "revision",
            Mode::ClosestRevision => "closest-revision",
            Mode::Version => "version",
            Mode::CheckoutDate => "checkout-date",
            Mode::Date => "date",
        }
    }

    /// Modes usable against records of `provider`
    pub fn supported_by(provider: ProviderKind) -> Vec<Mode> {
        Self::ALL
            .into_iter()
            .filter(|mode| *mode != Mode::CheckoutDate || provider.supports_checkout_date())
            .collect()
    }

    pub fn choices() -> String {
        join_choices(Self::ALL.iter().map(|m| m.as_str()))
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown mode {s}: should be one of ({})", Self::choices()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn join_choices<'a>(choices: impl Iterator<Item = &'a str>) -> String {
    choices.collect::<Vec<_>>().join(", ")
}

/// Validated single-record request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub os: OperatingSystem,
    pub stability: Stability,
    pub mode: Mode,
    /// Interpreted according to `mode` when predicates are built
    pub mode_value: String,
    /// Revision groups to step away from the baseline match
    pub offset: i64,
}

impl Criteria {
    /// Criteria with the mode's default stability and no offset
    pub fn new(os: OperatingSystem, mode: Mode, mode_value: impl Into<String>) -> Self {
        Self {
            os,
            stability: Stability::default_for(mode),
            mode,
            mode_value: mode_value.into(),
            offset: 0,
        }
    }

    /// Most recent build for `os` on `stability`
    pub fn latest(os: OperatingSystem, stability: Stability) -> Self {
        Self::new(os, Mode::Date, DISTANT_DATE).with_stability(stability)
    }

    pub fn with_stability(mut self, stability: Stability) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Build criteria from request parameters
    ///
    /// `os` is required. Validation order: os, offset, mode, stability.
    pub fn from_params(params: &Params, provider: ProviderKind) -> Result<Self> {
        let os = match params.get("os") {
            Some(os) => parse_os(os)?,
            None => {
                return Err(Error::InvalidCriteria(format!(
                    "missing os: should be one of ({})",
                    OperatingSystem::choices()
                )));
            }
        };
        let offset = parse_offset(params)?;
        let (mode, mode_value) = mode_from_params(params, provider)?;
        let stability = match params.get("stability") {
            Some(stability) => parse_stability(stability)?,
            None => Stability::default_for(mode),
        };

        Ok(Self {
            os,
            stability,
            mode,
            mode_value,
            offset,
        })
    }
}

/// Validated request spanning several operating systems and stabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepCriteria {
    pub oses: Vec<OperatingSystem>,
    pub stabilities: Vec<Stability>,
    pub mode: Mode,
    pub mode_value: String,
    pub offset: i64,
}

impl SweepCriteria {
    /// Build sweep criteria from request parameters
    ///
    /// Without `os` every operating system is swept; without `stability`
    /// both `release` and `nightly` are, but not `any`.
    pub fn from_params(params: &Params, provider: ProviderKind) -> Result<Self> {
        let offset = parse_offset(params)?;
        let (mode, mode_value) = mode_from_params(params, provider)?;

        let oses = match params.get("os") {
            Some(os) => vec![parse_os(os)?],
            None => OperatingSystem::ALL.to_vec(),
        };
        let stabilities = match params.get("stability") {
            Some(stability) => vec![parse_stability(stability)?],
            None => vec![Stability::Release, Stability::Nightly],
        };

        Ok(Self {
            oses,
            stabilities,
            mode,
            mode_value,
            offset,
        })
    }

    /// Single-record criteria for one cell of the sweep
    pub fn cell(&self, os: OperatingSystem, stability: Stability) -> Criteria {
        Criteria {
            os,
            stability,
            mode: self.mode,
            mode_value: self.mode_value.clone(),
            offset: self.offset,
        }
    }
}

fn parse_os(value: &str) -> Result<OperatingSystem> {
    value.parse().map_err(Error::InvalidCriteria)
}

fn parse_stability(value: &str) -> Result<Stability> {
    value.parse().map_err(Error::InvalidCriteria)
}

fn parse_offset(params: &Params) -> Result<i64> {
    let Some(offset) = params.get("offset") else {
        return Ok(0);
    };
    offset.trim().parse().map_err(|_| {
        Error::InvalidCriteria(format!(
            "bad offset \"{offset}\": should be specified as an integer"
        ))
    })
}

/// Pick the single mode parameter present in `params`
///
/// No mode parameter selects the most recent build through
/// [`DISTANT_DATE`]. More than one is ambiguous.
pub fn mode_from_params(params: &Params, provider: ProviderKind) -> Result<(Mode, String)> {
    let present: Vec<(Mode, &String)> = Mode::ALL
        .into_iter()
        .filter_map(|mode| params.get(mode.as_str()).map(|value| (mode, value)))
        .collect();

    let (mode, value) = match present.as_slice() {
        [] => (Mode::Date, DISTANT_DATE.to_string()),
        [(mode, value)] => (*mode, (*value).clone()),
        _ => {
            return Err(Error::InvalidCriteria(format!(
                "invalid or ambiguous mode: should be one of ({})",
                Mode::choices()
            )));
        }
    };

    let supported = Mode::supported_by(provider);
    if !supported.contains(&mode) {
        return Err(Error::InvalidCriteria(format!(
            "unsupported mode: should be one of ({})",
            join_choices(supported.iter().map(|m| m.as_str()))
        )));
    }

    Ok((mode, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_to_latest_release() {
        let criteria =
            Criteria::from_params(&params(&[("os", "linux")]), ProviderKind::Girder).unwrap();
        assert_eq!(criteria.os, OperatingSystem::Linux);
        assert_eq!(criteria.mode, Mode::Date);
        assert_eq!(criteria.mode_value, DISTANT_DATE);
        assert_eq!(criteria.stability, Stability::Release);
        assert_eq!(criteria.offset, 0);
    }

    #[test]
    fn test_revision_mode_defaults_to_any_stability() {
        let criteria = Criteria::from_params(
            &params(&[("os", "win"), ("revision", "30000")]),
            ProviderKind::Girder,
        )
        .unwrap();
        assert_eq!(criteria.mode, Mode::Revision);
        assert_eq!(criteria.mode_value, "30000");
        assert_eq!(criteria.stability, Stability::Any);
    }

    #[test]
    fn test_explicit_stability_and_offset() {
        let criteria = Criteria::from_params(
            &params(&[
                ("os", "macosx"),
                ("version", "5.2"),
                ("stability", "nightly"),
                ("offset", "-2"),
            ]),
            ProviderKind::Girder,
        )
        .unwrap();
        assert_eq!(criteria.stability, Stability::Nightly);
        assert_eq!(criteria.offset, -2);
        assert_eq!(criteria.mode, Mode::Version);
    }

    #[test]
    fn test_unknown_os() {
        let err = Criteria::from_params(&params(&[("os", "bsd")]), ProviderKind::Girder)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCriteria(_)));
        assert!(err.to_string().starts_with("unknown os \"bsd\""));
    }

    #[test]
    fn test_missing_os() {
        let err = Criteria::from_params(&params(&[]), ProviderKind::Girder).unwrap_err();
        assert!(err.to_string().starts_with("missing os"));
    }

    #[test]
    fn test_bad_offset() {
        let err = Criteria::from_params(
            &params(&[("os", "linux"), ("offset", "one")]),
            ProviderKind::Girder,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad offset \"one\": should be specified as an integer"
        );
    }

    #[test]
    fn test_bad_stability() {
        let err = Criteria::from_params(
            &params(&[("os", "linux"), ("stability", "beta")]),
            ProviderKind::Girder,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("bad stability beta"));
    }

    #[test]
    fn test_ambiguous_mode() {
        let err = Criteria::from_params(
            &params(&[("os", "linux"), ("revision", "100"), ("version", "4.5")]),
            ProviderKind::Midas,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCriteria(_)));
        assert!(err.to_string().contains("ambiguous mode"));
    }

    #[test]
    fn test_checkout_date_unsupported_for_girder() {
        let err = Criteria::from_params(
            &params(&[("os", "linux"), ("checkout-date", "2020-01-01")]),
            ProviderKind::Girder,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("unsupported mode"));
        assert!(!err.to_string().contains("checkout-date"));

        let criteria = Criteria::from_params(
            &params(&[("os", "linux"), ("checkout-date", "2020-01-01")]),
            ProviderKind::Midas,
        )
        .unwrap();
        assert_eq!(criteria.mode, Mode::CheckoutDate);
    }

    #[test]
    fn test_sweep_defaults() {
        let sweep = SweepCriteria::from_params(&params(&[]), ProviderKind::Girder).unwrap();
        assert_eq!(sweep.oses, OperatingSystem::ALL.to_vec());
        assert_eq!(sweep.stabilities, vec![Stability::Release, Stability::Nightly]);
        assert_eq!(sweep.mode, Mode::Date);
    }

    #[test]
    fn test_sweep_restricted() {
        let sweep = SweepCriteria::from_params(
            &params(&[("os", "win"), ("stability", "any"), ("offset", "1")]),
            ProviderKind::Girder,
        )
        .unwrap();
        assert_eq!(sweep.oses, vec![OperatingSystem::Win]);
        assert_eq!(sweep.stabilities, vec![Stability::Any]);

        let cell = sweep.cell(OperatingSystem::Win, Stability::Any);
        assert_eq!(cell.offset, 1);
        assert_eq!(cell.mode_value, DISTANT_DATE);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("closest-revision".parse::<Mode>().unwrap(), Mode::ClosestRevision);
        assert!("latest".parse::<Mode>().is_err());
    }
}

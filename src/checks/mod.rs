//! Argo real-time quality control checks
//!
//! Each check reads property arrays from a profile (and optionally its
//! predecessor) and writes flags into a fresh [`CheckOutput`]. Checks are
//! trait objects behind [`Check`]; [`CheckKind`] names the built-in ones so
//! they can be selected from configuration.
//!
//! # Available checks
//!
//! - [`GlobalRangeCheck`] - Argo test 6, fixed limits on PRES, TEMP and PSAL
//! - [`PressureIncreasingCheck`] - Argo test 8, monotonically increasing pressure
//!
//! [`PropertyRangeCheck`] is the generic range primitive the global range
//! test is built on.

pub mod global_range;
pub mod pressure_increasing;
pub mod range;

pub use global_range::GlobalRangeCheck;
pub use pressure_increasing::PressureIncreasingCheck;
pub use range::{PropertyRangeCheck, RangeRule, outside_range};

use crate::config::QcConfig;
use crate::error::Result;
use crate::flags::ArgoQcFlag;
use crate::output::{CheckOutput, Selection};
use crate::profile::{Property, ProfileSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, info_span};

/// Argo vocabulary metadata identifying a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckInfo {
    /// Argo test number
    pub argo_id: u32,
    /// Bit of the test in the Argo QC test bitmask
    pub argo_binary_id: u32,
    /// Test name from the Argo manual
    pub argo_name: &'static str,
    /// NERC vocabulary server entry
    pub nvs_uri: &'static str,
}

impl fmt::Display for CheckInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (test {})", self.argo_name, self.argo_id)
    }
}

/// A quality control check bound to one profile
pub trait Check<'a> {
    /// Identification of this check in the Argo vocabulary
    fn info(&self) -> CheckInfo;

    /// Run the check, returning the flags for every property it inspected
    fn run(&self) -> Result<CheckOutput<'a>>;

    /// Whether the check must run; optional checks may be skipped by configuration
    fn is_required(&self) -> bool {
        true
    }
}

/// Built-in checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    GlobalRange,
    PressureIncreasing,
}

impl CheckKind {
    /// All built-in checks, in Argo test order
    pub fn all_values() -> Vec<CheckKind> {
        vec![CheckKind::GlobalRange, CheckKind::PressureIncreasing]
    }

    /// Bind this check to a profile and its predecessor
    pub fn build<'a>(
        self,
        profile: &'a dyn ProfileSource,
        previous: Option<&'a dyn ProfileSource>,
        config: &QcConfig,
    ) -> Box<dyn Check<'a> + 'a> {
        match self {
            CheckKind::GlobalRange => Box::new(GlobalRangeCheck::with_config(
                profile,
                previous,
                config.global_range.clone(),
            )),
            CheckKind::PressureIncreasing => {
                Box::new(PressureIncreasingCheck::new(profile, previous))
            }
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::GlobalRange => f.write_str("global-range"),
            CheckKind::PressureIncreasing => f.write_str("pressure-increasing"),
        }
    }
}

// =============================================================================
// Running Checks
// =============================================================================

/// Output of one check within a run
#[derive(Debug)]
pub struct CheckResult<'a> {
    pub info: CheckInfo,
    pub output: CheckOutput<'a>,
}

/// Outputs of every check run against one profile
#[derive(Debug, Default)]
pub struct CheckRun<'a> {
    pub results: Vec<CheckResult<'a>>,
    pub skipped: Vec<CheckInfo>,
}

impl CheckRun<'_> {
    /// Argo QC test bitmask of the checks performed
    pub fn tests_performed(&self) -> u32 {
        self.results
            .iter()
            .fold(0, |mask, result| mask | result.info.argo_binary_id)
    }

    /// Argo QC test bitmask of the checks that flagged at least one sample
    /// probably bad or worse
    pub fn tests_failed(&self) -> u32 {
        self.results
            .iter()
            .filter(|result| {
                result.output.properties().any(|property| {
                    result.output.get_flags(property).is_ok_and(|flags| {
                        flags.count(ArgoQcFlag::Bad) + flags.count(ArgoQcFlag::ProbablyBad) > 0
                    })
                })
            })
            .fold(0, |mask, result| mask | result.info.argo_binary_id)
    }

    /// Combine all outputs into one through the precedence table
    pub fn merged<'p>(&self, profile: &'p dyn ProfileSource) -> Result<CheckOutput<'p>> {
        let mut merged = CheckOutput::new(profile);
        for result in &self.results {
            merged.merge_from(&result.output)?;
        }
        Ok(merged)
    }
}

/// Run each check in turn, skipping optional ones when asked to
pub fn run_all<'a>(
    checks: Vec<Box<dyn Check<'a> + 'a>>,
    skip_optional: bool,
) -> Result<CheckRun<'a>> {
    let mut run = CheckRun::default();

    for check in checks {
        let info = check.info();
        if skip_optional && !check.is_required() {
            debug!("Skipping optional check: {}", info);
            run.skipped.push(info);
            continue;
        }

        let _span = info_span!("check", id = info.argo_id).entered();
        let output = check.run()?;
        let (bad, probably_bad) = output
            .properties()
            .filter_map(|property| output.get_flags(property).ok())
            .fold((0, 0), |(bad, pb), flags| {
                (
                    bad + flags.count(ArgoQcFlag::Bad),
                    pb + flags.count(ArgoQcFlag::ProbablyBad),
                )
            });
        info!(
            "Completed {}: {} bad, {} probably bad flags",
            info, bad, probably_bad
        );
        run.results.push(CheckResult { info, output });
    }

    Ok(run)
}

/// Build and run the checks enabled in `config` against one profile
pub fn run_checks<'a>(
    profile: &'a dyn ProfileSource,
    previous: Option<&'a dyn ProfileSource>,
    config: &QcConfig,
) -> Result<CheckRun<'a>> {
    let checks = config
        .checks
        .iter()
        .map(|kind| kind.build(profile, previous, config))
        .collect();
    run_all(checks, config.skip_optional)
}

/// Mark the selected samples of `property` as good
///
/// Only samples still at `NO_QC` change; failures flagged afterwards replace
/// the good flag through the precedence table.
pub(crate) fn flag_checked_good(
    output: &mut CheckOutput<'_>,
    property: Property,
    checked: &[bool],
) -> Result<usize> {
    output.set_flag(property, ArgoQcFlag::Good, Selection::Mask(checked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Profile, PropertyData};

    struct FakeOptionalCheck<'a> {
        profile: &'a dyn ProfileSource,
    }

    impl<'a> Check<'a> for FakeOptionalCheck<'a> {
        fn info(&self) -> CheckInfo {
            CheckInfo {
                argo_id: 99,
                argo_binary_id: 0,
                argo_name: "Fake optional test",
                nvs_uri: "",
            }
        }

        fn run(&self) -> Result<CheckOutput<'a>> {
            Ok(CheckOutput::new(self.profile))
        }

        fn is_required(&self) -> bool {
            false
        }
    }

    fn create_test_profile(pressure: Vec<f64>, temperature: Vec<f64>) -> Profile {
        let n = pressure.len();
        Profile::new(
            PropertyData::from_values(pressure),
            PropertyData::from_values(temperature),
            PropertyData::from_values(vec![35.0; n]),
        )
        .unwrap()
    }

    #[test]
    fn test_check_is_required_by_default() {
        let profile = create_test_profile(vec![0.0], vec![10.0]);
        let check = PressureIncreasingCheck::new(&profile, None);
        assert!(check.is_required());
    }

    #[test]
    fn test_run_checks_with_default_config() {
        let profile = create_test_profile(vec![0.0, 1.0, 1.0], vec![10.0, 50.0, 10.0]);
        let run = run_checks(&profile, None, &QcConfig::default()).unwrap();

        assert_eq!(run.results.len(), 2);
        assert!(run.skipped.is_empty());
        assert_eq!(run.tests_performed(), 64 | 256);
        assert_eq!(run.tests_failed(), 64 | 256);

        let merged = run.merged(&profile).unwrap();
        assert_eq!(
            merged.get_flags(Property::Temperature).unwrap().as_slice(),
            &[ArgoQcFlag::Good, ArgoQcFlag::Bad, ArgoQcFlag::Bad]
        );
        assert_eq!(
            merged.get_flags(Property::Pressure).unwrap().as_slice(),
            &[ArgoQcFlag::Good, ArgoQcFlag::Good, ArgoQcFlag::Bad]
        );
    }

    #[test]
    fn test_run_checks_respects_selection() {
        let profile = create_test_profile(vec![0.0, 1.0], vec![10.0, 10.0]);
        let config = QcConfig::default().with_checks(vec![CheckKind::PressureIncreasing]);
        let run = run_checks(&profile, None, &config).unwrap();

        assert_eq!(run.results.len(), 1);
        assert_eq!(run.results[0].info.argo_id, 8);
        assert_eq!(run.tests_failed(), 0);
    }

    #[test]
    fn test_run_all_skips_optional_checks() {
        let profile = create_test_profile(vec![0.0], vec![10.0]);
        let checks: Vec<Box<dyn Check<'_> + '_>> = vec![
            Box::new(FakeOptionalCheck { profile: &profile }),
            Box::new(PressureIncreasingCheck::new(&profile, None)),
        ];

        let run = run_all(checks, true).unwrap();
        assert_eq!(run.results.len(), 1);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].argo_id, 99);
    }

    #[test]
    fn test_run_all_keeps_optional_checks_by_default() {
        let profile = create_test_profile(vec![0.0], vec![10.0]);
        let checks: Vec<Box<dyn Check<'_> + '_>> =
            vec![Box::new(FakeOptionalCheck { profile: &profile })];

        let run = run_all(checks, false).unwrap();
        assert_eq!(run.results.len(), 1);
        assert!(run.skipped.is_empty());
    }

    #[test]
    fn test_check_kind_names() {
        assert_eq!(CheckKind::GlobalRange.to_string(), "global-range");
        assert_eq!(CheckKind::PressureIncreasing.to_string(), "pressure-increasing");
        assert_eq!(CheckKind::all_values().len(), 2);
    }
}

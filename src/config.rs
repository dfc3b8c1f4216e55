//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! the environment, then command line flags (applied by the caller through
//! the `with_*` builders).

use crate::checks::{CheckKind, RangeRule};
use crate::constants::{
    ENV_SKIP_OPTIONAL, PRESSURE_BAD_MIN, PRESSURE_PROBABLY_BAD_MIN, SALINITY_MAX, SALINITY_MIN,
    TEMPERATURE_MAX, TEMPERATURE_MIN,
};
use crate::error::{QcError, Result};
use crate::flags::ArgoQcFlag;
use crate::profile::Property;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Limits used by the global range test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalRangeConfig {
    /// Pressure below this is bad (dbar)
    pub pressure_bad_min: f64,

    /// Pressure below this is probably bad (dbar)
    pub pressure_probably_bad_min: f64,

    /// Temperature limits (degC)
    pub temperature_min: f64,
    pub temperature_max: f64,

    /// Salinity limits (PSU)
    pub salinity_min: f64,
    pub salinity_max: f64,
}

impl Default for GlobalRangeConfig {
    fn default() -> Self {
        Self {
            pressure_bad_min: PRESSURE_BAD_MIN,
            pressure_probably_bad_min: PRESSURE_PROBABLY_BAD_MIN,
            temperature_min: TEMPERATURE_MIN,
            temperature_max: TEMPERATURE_MAX,
            salinity_min: SALINITY_MIN,
            salinity_max: SALINITY_MAX,
        }
    }
}

impl GlobalRangeConfig {
    /// Range rules for these limits, in application order
    ///
    /// The probably-bad pressure rule must follow the bad one: it re-examines
    /// PRES with a looser bound and cannot downgrade samples already bad.
    pub fn rules(&self) -> Vec<RangeRule> {
        vec![
            RangeRule::new(Property::Pressure, ArgoQcFlag::Bad)
                .with_lower_limit(self.pressure_bad_min)
                .flagging(&Property::ALL),
            RangeRule::new(Property::Pressure, ArgoQcFlag::ProbablyBad)
                .with_lower_limit(self.pressure_probably_bad_min)
                .flagging(&Property::ALL),
            RangeRule::new(Property::Temperature, ArgoQcFlag::Bad)
                .with_lower_limit(self.temperature_min)
                .with_upper_limit(self.temperature_max),
            RangeRule::new(Property::Salinity, ArgoQcFlag::Bad)
                .with_lower_limit(self.salinity_min)
                .with_upper_limit(self.salinity_max),
        ]
    }

    fn bounds(&self) -> [(&'static str, f64); 6] {
        [
            ("pressure_bad_min", self.pressure_bad_min),
            ("pressure_probably_bad_min", self.pressure_probably_bad_min),
            ("temperature_min", self.temperature_min),
            ("temperature_max", self.temperature_max),
            ("salinity_min", self.salinity_min),
            ("salinity_max", self.salinity_max),
        ]
    }
}

/// Main configuration for a quality control run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QcConfig {
    /// Checks to run, in order
    pub checks: Vec<CheckKind>,

    /// Skip checks that report themselves as optional
    pub skip_optional: bool,

    /// Global range test limits
    pub global_range: GlobalRangeConfig,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            checks: CheckKind::all_values(),
            skip_optional: false,
            global_range: GlobalRangeConfig::default(),
        }
    }
}

impl QcConfig {
    /// Run only these checks
    pub fn with_checks(mut self, checks: Vec<CheckKind>) -> Self {
        self.checks = checks;
        self
    }

    /// Enable or disable skipping of optional checks
    pub fn with_skip_optional(mut self, skip_optional: bool) -> Self {
        self.skip_optional = skip_optional;
        self
    }

    /// Use custom global range limits
    pub fn with_global_range(mut self, global_range: GlobalRangeConfig) -> Self {
        self.global_range = global_range;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SKIP_OPTIONAL) {
            self.skip_optional = parse_bool_flag(ENV_SKIP_OPTIONAL, &value)?;
            debug!("{} overrides skip_optional = {}", ENV_SKIP_OPTIONAL, self.skip_optional);
        }
        Ok(self)
    }

    /// Defaults, then the optional file, then the environment
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no check can work with
    pub fn validate(&self) -> Result<()> {
        if self.checks.is_empty() {
            return Err(QcError::configuration("at least one check must be enabled"));
        }

        for (name, value) in self.global_range.bounds() {
            if value.is_nan() {
                return Err(QcError::configuration(format!(
                    "global_range.{name} must be a number"
                )));
            }
        }

        Ok(())
    }
}

/// Parse a boolean environment value
pub fn parse_bool_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(QcError::configuration(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

//! Global range test (Argo test 6)
//!
//! Applies the fixed Argo limits to pressure, temperature and salinity.
//! Pressure failures condemn the whole level; temperature and salinity
//! failures only their own property.

use crate::config::GlobalRangeConfig;
use crate::constants::global_range_test;
use crate::error::Result;
use crate::output::CheckOutput;
use crate::profile::{Property, ProfileSource};
use tracing::debug;

use super::range::{PropertyRangeCheck, RangeRule};
use super::{Check, CheckInfo, flag_checked_good};

/// Check the pressure, temperature and salinity meet global range requirements
pub struct GlobalRangeCheck<'a> {
    profile: &'a dyn ProfileSource,
    profile_previous: Option<&'a dyn ProfileSource>,
    limits: GlobalRangeConfig,
}

impl<'a> GlobalRangeCheck<'a> {
    /// Check with the limits from the Argo manual
    pub fn new(
        profile: &'a dyn ProfileSource,
        profile_previous: Option<&'a dyn ProfileSource>,
    ) -> Self {
        Self::with_config(profile, profile_previous, GlobalRangeConfig::default())
    }

    /// Check with custom limits
    pub fn with_config(
        profile: &'a dyn ProfileSource,
        profile_previous: Option<&'a dyn ProfileSource>,
        limits: GlobalRangeConfig,
    ) -> Self {
        Self {
            profile,
            profile_previous,
            limits,
        }
    }

    /// Profile preceding the one under test; unused by this check
    pub fn profile_previous(&self) -> Option<&'a dyn ProfileSource> {
        self.profile_previous
    }

    /// Rules in application order
    pub fn rules(&self) -> Vec<RangeRule> {
        self.limits.rules()
    }
}

impl<'a> Check<'a> for GlobalRangeCheck<'a> {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            argo_id: global_range_test::ARGO_ID,
            argo_binary_id: global_range_test::ARGO_BINARY_ID,
            argo_name: global_range_test::ARGO_NAME,
            nvs_uri: global_range_test::NVS_URI,
        }
    }

    fn run(&self) -> Result<CheckOutput<'a>> {
        let mut output = CheckOutput::new(self.profile);

        for property in Property::ALL {
            let checked = self.profile.get_property_data(property)?.valid_mask();
            flag_checked_good(&mut output, property, &checked)?;
        }

        let failures =
            PropertyRangeCheck::new(self.profile).apply_rules(&mut output, &self.rules())?;
        debug!("Global range: {} out-of-range samples", failures);

        Ok(output)
    }
}

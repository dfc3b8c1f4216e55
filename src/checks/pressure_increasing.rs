//! Pressure increasing test (Argo test 8)
//!
//! Pressure must increase monotonically along each profile row. Any sample
//! that does not rise above every earlier sample is bad, together with the
//! temperature and salinity measured at the same level.
//!
//! Three passes feed the same output:
//!
//! 1. decreasing first difference (a drop from the previous sample)
//! 2. zero first difference (an immediate repeat)
//! 3. flat running maximum (still below an earlier peak, e.g. a dip followed
//!    by a partial recovery)
//!
//! Missing samples are skipped: differences are taken against the previous
//! present sample in the same row, and the first present sample always passes.

use crate::constants::pressure_increasing_test;
use crate::error::Result;
use crate::flags::ArgoQcFlag;
use crate::output::{CheckOutput, Selection};
use crate::profile::{Property, PropertyData, ProfileSource, Shape};
use tracing::debug;

use super::{Check, CheckInfo, flag_checked_good};

const FLAGGED_PROPERTIES: [Property; 3] = Property::ALL;

/// Check for monotonically increasing pressure in a profile
pub struct PressureIncreasingCheck<'a> {
    profile: &'a dyn ProfileSource,
    profile_previous: Option<&'a dyn ProfileSource>,
}

impl<'a> PressureIncreasingCheck<'a> {
    /// Bind the check to `profile` and the profile before it (`None` if first)
    pub fn new(
        profile: &'a dyn ProfileSource,
        profile_previous: Option<&'a dyn ProfileSource>,
    ) -> Self {
        Self {
            profile,
            profile_previous,
        }
    }

    /// Profile preceding the one under test; unused by this check
    pub fn profile_previous(&self) -> Option<&'a dyn ProfileSource> {
        self.profile_previous
    }

    fn flag_bad(
        &self,
        output: &mut CheckOutput<'a>,
        pass: &str,
        selection: &[bool],
    ) -> Result<()> {
        let count = selection.iter().filter(|s| **s).count();
        debug!("Pressure increasing {} pass: {} samples", pass, count);
        output.set_flag_for_many(
            &FLAGGED_PROPERTIES,
            ArgoQcFlag::Bad,
            Selection::Mask(selection),
        )?;
        Ok(())
    }
}

impl<'a> Check<'a> for PressureIncreasingCheck<'a> {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            argo_id: pressure_increasing_test::ARGO_ID,
            argo_binary_id: pressure_increasing_test::ARGO_BINARY_ID,
            argo_name: pressure_increasing_test::ARGO_NAME,
            nvs_uri: pressure_increasing_test::NVS_URI,
        }
    }

    fn run(&self) -> Result<CheckOutput<'a>> {
        let pressure = self.profile.get_property_data(Property::Pressure)?;

        let mut output = CheckOutput::new(self.profile);
        output.ensure_properties(&FLAGGED_PROPERTIES)?;

        // every level with a pressure reading is checked
        for property in FLAGGED_PROPERTIES {
            let values = self.profile.get_property_data(property)?;
            let checked: Vec<bool> = (0..pressure.len())
                .map(|i| pressure.is_valid(i) && values.is_valid(i))
                .collect();
            flag_checked_good(&mut output, property, &checked)?;
        }

        let samples = pressure.to_options();
        let diff = first_difference(pressure.shape(), &samples);

        let decreasing: Vec<bool> = diff.iter().map(|d| d.is_some_and(|d| d < 0.0)).collect();
        self.flag_bad(&mut output, "decreasing", &decreasing)?;

        let constant: Vec<bool> = diff.iter().map(|d| d.is_some_and(|d| d == 0.0)).collect();
        self.flag_bad(&mut output, "constant", &constant)?;

        let maximum = running_maximum(pressure);
        let below_maximum: Vec<bool> = first_difference(pressure.shape(), &maximum)
            .iter()
            .map(|d| d.is_some_and(|d| d == 0.0))
            .collect();
        self.flag_bad(&mut output, "running maximum", &below_maximum)?;

        Ok(output)
    }
}

/// Difference to the previous present sample of the same row
///
/// The sample before the first is taken as negative infinity, so the first
/// present sample of each row gets `+inf`. Missing samples yield `None`.
pub fn first_difference(shape: Shape, samples: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut diff = vec![None; samples.len()];
    for row in 0..shape.rows {
        let mut previous = f64::NEG_INFINITY;
        for i in shape.row_range(row) {
            if let Some(value) = samples[i] {
                diff[i] = Some(value - previous);
                previous = value;
            }
        }
    }
    diff
}

/// Running maximum of the present samples along each row
pub fn running_maximum(data: &PropertyData) -> Vec<Option<f64>> {
    let shape = data.shape();
    let mut maximum = vec![None; data.len()];
    for row in 0..shape.rows {
        let mut current = f64::NEG_INFINITY;
        for i in shape.row_range(row) {
            if let Some(value) = data.get(i) {
                current = current.max(value);
                maximum[i] = Some(current);
            }
        }
    }
    maximum
}

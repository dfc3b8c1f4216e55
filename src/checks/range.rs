//! Generic range checking
//!
//! Flags samples lying outside an inclusive `[lower, upper]` interval. Either
//! bound may be absent. The flags can land on the inspected property or on a
//! different list of properties (a bad pressure also condemns the
//! temperature and salinity measured with it).

use crate::error::Result;
use crate::flags::ArgoQcFlag;
use crate::output::{CheckOutput, Selection};
use crate::profile::{Property, PropertyData, ProfileSource};
use tracing::debug;

/// One out-of-range rule
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRule {
    /// Property whose values are inspected
    pub property: Property,
    /// Flag given to out-of-range samples
    pub flag: ArgoQcFlag,
    /// Values below this fail; `None` means unbounded
    pub lower_limit: Option<f64>,
    /// Values above this fail; `None` means unbounded
    pub upper_limit: Option<f64>,
    /// Properties to flag, empty for the inspected property only
    pub properties_to_be_flagged: Vec<Property>,
}

impl RangeRule {
    /// Unbounded rule for `property`
    pub fn new(property: Property, flag: ArgoQcFlag) -> Self {
        Self {
            property,
            flag,
            lower_limit: None,
            upper_limit: None,
            properties_to_be_flagged: Vec::new(),
        }
    }

    pub fn with_lower_limit(mut self, lower_limit: f64) -> Self {
        self.lower_limit = Some(lower_limit);
        self
    }

    pub fn with_upper_limit(mut self, upper_limit: f64) -> Self {
        self.upper_limit = Some(upper_limit);
        self
    }

    /// Flag these properties instead of the inspected one
    pub fn flagging(mut self, properties: &[Property]) -> Self {
        self.properties_to_be_flagged = properties.to_vec();
        self
    }

    /// Properties receiving the flag
    pub fn targets(&self) -> &[Property] {
        if self.properties_to_be_flagged.is_empty() {
            std::slice::from_ref(&self.property)
        } else {
            &self.properties_to_be_flagged
        }
    }
}

/// Element-wise `value < lower || value > upper`; missing samples never fail
///
/// With `lower > upper` every present sample fails.
pub fn outside_range(data: &PropertyData, lower: Option<f64>, upper: Option<f64>) -> Vec<bool> {
    let lower = lower.unwrap_or(f64::NEG_INFINITY);
    let upper = upper.unwrap_or(f64::INFINITY);

    (0..data.len())
        .map(|i| data.get(i).is_some_and(|value| value < lower || value > upper))
        .collect()
}

/// Range checking bound to one profile
///
/// Checks compose one or more [`RangeRule`]s on top of this; rule order
/// matters when a looser rule re-examines the same property with a weaker
/// flag.
pub struct PropertyRangeCheck<'a> {
    profile: &'a dyn ProfileSource,
}

impl<'a> PropertyRangeCheck<'a> {
    pub fn new(profile: &'a dyn ProfileSource) -> Self {
        Self { profile }
    }

    /// Apply `rule`, flagging out-of-range samples through `output`.
    /// Returns the number of out-of-range samples found.
    pub fn set_output_flags_for_value_outside_range(
        &self,
        output: &mut CheckOutput<'_>,
        rule: &RangeRule,
    ) -> Result<usize> {
        let values = self.profile.get_property_data(rule.property)?;
        let bad_values = outside_range(values, rule.lower_limit, rule.upper_limit);
        let failures = bad_values.iter().filter(|bad| **bad).count();

        debug!(
            "{} outside [{:?}, {:?}]: {} samples flagged {}",
            rule.property, rule.lower_limit, rule.upper_limit, failures, rule.flag
        );

        let targets = rule.targets();
        output.ensure_properties(targets)?;
        output.set_flag_for_many(targets, rule.flag, Selection::Mask(&bad_values))?;

        Ok(failures)
    }

    /// Apply each rule in order
    pub fn apply_rules(&self, output: &mut CheckOutput<'_>, rules: &[RangeRule]) -> Result<usize> {
        let mut failures = 0;
        for rule in rules {
            failures += self.set_output_flags_for_value_outside_range(output, rule)?;
        }
        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QcError;
    use crate::profile::Profile;

    fn test_values() -> PropertyData {
        PropertyData::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0])
    }

    fn create_test_profile(temperature: Vec<Option<f64>>) -> Profile {
        let n = temperature.len();
        Profile::new(
            PropertyData::from_values((0..n).map(|i| i as f64).collect()),
            PropertyData::from_options(temperature),
            PropertyData::from_values(vec![35.0; n]),
        )
        .unwrap()
    }

    #[test]
    fn test_outside_range_both_bounds() {
        assert_eq!(
            outside_range(&test_values(), Some(2.5), Some(4.5)),
            vec![true, true, false, false, true]
        );
    }

    #[test]
    fn test_outside_range_upper_only() {
        assert_eq!(
            outside_range(&test_values(), None, Some(4.5)),
            vec![false, false, false, false, true]
        );
    }

    #[test]
    fn test_outside_range_unbounded() {
        assert_eq!(outside_range(&test_values(), None, None), vec![false; 5]);
    }

    #[test]
    fn test_outside_range_lower_only() {
        assert_eq!(
            outside_range(&test_values(), Some(4.5), None),
            vec![true, true, true, true, false]
        );
    }

    #[test]
    fn test_outside_range_bounds_are_inclusive() {
        let values = PropertyData::from_values(vec![2.5, 4.5, 2.4999, 4.5001]);
        assert_eq!(
            outside_range(&values, Some(2.5), Some(4.5)),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn test_outside_range_inverted_bounds_fail_everything() {
        assert_eq!(outside_range(&test_values(), Some(4.0), Some(2.0)), vec![true; 5]);
    }

    #[test]
    fn test_outside_range_ignores_missing_samples() {
        let values = PropertyData::from_options(vec![Some(-10.0), None, Some(100.0)]);
        assert_eq!(
            outside_range(&values, Some(0.0), Some(10.0)),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_rule_targets_default_to_inspected_property() {
        let rule = RangeRule::new(Property::Temperature, ArgoQcFlag::Bad);
        assert_eq!(rule.targets(), &[Property::Temperature]);

        let rule = rule.flagging(&[Property::Pressure, Property::Salinity]);
        assert_eq!(rule.targets(), &[Property::Pressure, Property::Salinity]);
    }

    #[test]
    fn test_set_output_flags_for_value_outside_range() {
        let profile = create_test_profile(vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]);
        let check = PropertyRangeCheck::new(&profile);
        let mut output = CheckOutput::new(&profile);

        let rule = RangeRule::new(Property::Temperature, ArgoQcFlag::Bad)
            .with_lower_limit(2.5)
            .with_upper_limit(4.5);
        let failures = check
            .set_output_flags_for_value_outside_range(&mut output, &rule)
            .unwrap();

        assert_eq!(failures, 3);
        assert_eq!(
            output.get_flags(Property::Temperature).unwrap().as_slice(),
            &[
                ArgoQcFlag::Bad,
                ArgoQcFlag::Bad,
                ArgoQcFlag::NoQc,
                ArgoQcFlag::NoQc,
                ArgoQcFlag::Bad
            ]
        );
        // only the inspected property gets an output array
        assert!(matches!(
            output.get_flags(Property::Pressure),
            Err(QcError::UninitializedOutput { .. })
        ));
    }

    #[test]
    fn test_rule_flags_other_properties() {
        let profile = create_test_profile(vec![Some(1.0), Some(50.0)]);
        let check = PropertyRangeCheck::new(&profile);
        let mut output = CheckOutput::new(&profile);

        let rule = RangeRule::new(Property::Temperature, ArgoQcFlag::ProbablyBad)
            .with_upper_limit(40.0)
            .flagging(&[Property::Pressure, Property::Salinity]);
        check
            .set_output_flags_for_value_outside_range(&mut output, &rule)
            .unwrap();

        for property in [Property::Pressure, Property::Salinity] {
            assert_eq!(
                output.get_flags(property).unwrap().as_slice(),
                &[ArgoQcFlag::NoQc, ArgoQcFlag::ProbablyBad]
            );
        }
        assert!(output.get_flags(Property::Temperature).is_err());
    }
}

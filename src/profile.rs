//! Profile data access
//!
//! A profile is a read-only view over the pressure, temperature and salinity
//! series of one cast. Each series is a row-major 2-D array (profiles x
//! samples) of floating point values with a per-element mask; masked
//! samples are missing and never take part in a check.

use crate::constants::{PRESSURE, SALINITY, TEMPERATURE};
use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Property Names
// =============================================================================

/// Measured property of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    #[serde(rename = "PRES")]
    Pressure,
    #[serde(rename = "TEMP")]
    Temperature,
    #[serde(rename = "PSAL")]
    Salinity,
}

impl Property {
    /// All properties, in the order they are reported
    pub const ALL: [Property; 3] = [Property::Pressure, Property::Temperature, Property::Salinity];

    /// Argo variable name
    pub fn name(self) -> &'static str {
        match self {
            Property::Pressure => PRESSURE,
            Property::Temperature => TEMPERATURE,
            Property::Salinity => SALINITY,
        }
    }

    /// Name of the matching Argo QC variable, e.g. `PRES_QC`
    pub fn qc_name(self) -> String {
        format!("{}_QC", self.name())
    }

    /// Fail with `InvalidPropertyName` unless `name` is PRES, TEMP or PSAL
    pub fn validate_name(name: &str) -> Result<()> {
        name.parse::<Property>().map(|_| ())
    }
}

impl FromStr for Property {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            PRESSURE => Ok(Property::Pressure),
            TEMPERATURE => Ok(Property::Temperature),
            SALINITY => Ok(Property::Salinity),
            _ => Err(QcError::invalid_property(s)),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Property Data
// =============================================================================

/// Dimensions of a property array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub samples: usize,
}

impl Shape {
    pub fn new(rows: usize, samples: usize) -> Self {
        Self { rows, samples }
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.rows * self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index range covered by `row`
    pub fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.samples;
        start..start + self.samples
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.samples)
    }
}

/// Masked array of samples for one property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyData {
    shape: Shape,
    values: Vec<f64>,
    masked: Vec<bool>,
}

impl PropertyData {
    /// Single-row series with every finite value valid
    pub fn from_values(values: Vec<f64>) -> Self {
        let shape = Shape::new(1, values.len());
        Self::from_parts(shape, values, None)
    }

    /// Single-row series where `None` marks a missing sample
    pub fn from_options(values: Vec<Option<f64>>) -> Self {
        let shape = Shape::new(1, values.len());
        let masked = values.iter().map(Option::is_none).collect();
        let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Self::from_parts(shape, values, Some(masked))
    }

    /// Multi-row array; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let samples = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != samples) {
            return Err(QcError::ShapeMismatch {
                property: "rows".to_string(),
                expected: format!("{samples} samples per row"),
                found: format!("{} samples", bad.len()),
            });
        }
        let shape = Shape::new(rows.len(), samples);
        Ok(Self::from_parts(shape, rows.concat(), None))
    }

    /// Build from flat row-major values and an explicit mask (`true` = missing)
    pub fn with_mask(shape: Shape, values: Vec<f64>, masked: Vec<bool>) -> Result<Self> {
        if values.len() != shape.len() || masked.len() != shape.len() {
            return Err(QcError::ShapeMismatch {
                property: "values".to_string(),
                expected: format!("{} elements for shape {shape}", shape.len()),
                found: format!("{} values, {} mask entries", values.len(), masked.len()),
            });
        }
        Ok(Self::from_parts(shape, values, Some(masked)))
    }

    fn from_parts(shape: Shape, values: Vec<f64>, masked: Option<Vec<bool>>) -> Self {
        // NaN never compares, so it is treated as missing
        let masked = match masked {
            Some(mask) => mask
                .into_iter()
                .zip(&values)
                .map(|(m, v)| m || v.is_nan())
                .collect(),
            None => values.iter().map(|v| v.is_nan()).collect(),
        };
        Self {
            shape,
            values,
            masked,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values, including those under the mask
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Per-element mask, `true` where the sample is missing
    pub fn mask(&self) -> &[bool] {
        &self.masked
    }

    /// Value at flat index `index`, `None` if missing or out of range
    pub fn get(&self, index: usize) -> Option<f64> {
        match self.masked.get(index) {
            Some(false) => self.values.get(index).copied(),
            _ => None,
        }
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Masked values as options, flat row-major order
    pub fn to_options(&self) -> Vec<Option<f64>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Validity of every element (`true` = usable)
    pub fn valid_mask(&self) -> Vec<bool> {
        self.masked.iter().map(|m| !m).collect()
    }

    /// Number of non-missing samples
    pub fn valid_count(&self) -> usize {
        self.masked.iter().filter(|m| !**m).count()
    }
}

// =============================================================================
// Profile Accessor
// =============================================================================

/// Source of named property arrays for a single profile
///
/// Checks only rely on this contract, so test doubles and alternative
/// storage backends can stand in for [`Profile`].
pub trait ProfileSource {
    /// Array for `property`
    fn get_property_data(&self, property: Property) -> Result<&PropertyData>;

    /// Array for a property given by its Argo name
    fn get_property_data_by_name(&self, name: &str) -> Result<&PropertyData> {
        self.get_property_data(name.parse()?)
    }
}

/// In-memory profile holding PRES, TEMP and PSAL with a shared shape
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    label: String,
    pressure: PropertyData,
    temperature: PropertyData,
    salinity: PropertyData,
}

impl Profile {
    /// Create a profile, validating that all series share one index space
    pub fn new(
        pressure: PropertyData,
        temperature: PropertyData,
        salinity: PropertyData,
    ) -> Result<Self> {
        let expected = pressure.shape();
        for (property, data) in [
            (Property::Temperature, &temperature),
            (Property::Salinity, &salinity),
        ] {
            if data.shape() != expected {
                return Err(QcError::ShapeMismatch {
                    property: property.to_string(),
                    expected: expected.to_string(),
                    found: data.shape().to_string(),
                });
            }
        }

        Ok(Self {
            label: String::new(),
            pressure,
            temperature,
            salinity,
        })
    }

    /// Attach a human-readable label (file name, cycle number...)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> Shape {
        self.pressure.shape()
    }

    pub fn pressure(&self) -> &PropertyData {
        &self.pressure
    }

    pub fn temperature(&self) -> &PropertyData {
        &self.temperature
    }

    pub fn salinity(&self) -> &PropertyData {
        &self.salinity
    }

    /// Array for `property`
    pub fn property(&self, property: Property) -> &PropertyData {
        match property {
            Property::Pressure => &self.pressure,
            Property::Temperature => &self.temperature,
            Property::Salinity => &self.salinity,
        }
    }
}

impl ProfileSource for Profile {
    fn get_property_data(&self, property: Property) -> Result<&PropertyData> {
        Ok(self.property(property))
    }
}

// =============================================================================
// Profile Linkage
// =============================================================================

/// Chronologically ordered profiles from one float
///
/// Owns the profiles; each profile borrows its predecessor on demand.
#[derive(Debug, Clone, Default)]
pub struct ProfileSequence {
    profiles: Vec<Profile>,
}

impl ProfileSequence {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    pub fn push(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    /// Profile preceding `index`, `None` for the first one
    pub fn previous(&self, index: usize) -> Option<&Profile> {
        index.checked_sub(1).and_then(|i| self.profiles.get(i))
    }

    /// Each profile paired with its predecessor
    pub fn iter_linked(&self) -> impl Iterator<Item = (&Profile, Option<&Profile>)> {
        self.profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| (profile, self.previous(i)))
    }
}

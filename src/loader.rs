//! Profile loading from CSV files.
//!
//! One sample per line with `PRES`, `TEMP` and `PSAL` columns. Empty cells
//! are missing samples. An optional `N_PROF` column groups lines into rows of
//! a 2-D profile; rows shorter than the longest are padded with missing
//! samples.

use crate::constants::{PROFILE_INDEX_COLUMN, PROPERTY_NAMES};
use crate::error::{QcError, Result};
use crate::profile::{Profile, Property, PropertyData, Shape};
use polars::prelude::{CsvReadOptions, DataFrame, DataType, PolarsResult, SerReader};
use std::path::Path;
use tracing::{debug, warn};

/// Load a profile from a CSV file, labelled with the file stem
pub fn load_profile(path: &Path) -> Result<Profile> {
    debug!("Loading profile from {}", path.display());

    let df = read_csv(path).map_err(|e| QcError::profile_load(path, e.to_string()))?;
    let profile =
        profile_from_dataframe(&df).map_err(|e| QcError::profile_load(path, e.to_string()))?;

    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Loaded profile {} with shape {}", label, profile.shape());

    Ok(profile.with_label(label))
}

fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Build a profile from an in-memory frame with the same layout as the CSV
pub fn profile_from_dataframe(df: &DataFrame) -> Result<Profile> {
    let missing: Vec<&str> = PROPERTY_NAMES
        .iter()
        .copied()
        .filter(|name| df.get_column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(QcError::configuration(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let layout = RowLayout::from_dataframe(df)?;

    let pressure = layout.arrange(&float_column(df, Property::Pressure)?)?;
    let temperature = layout.arrange(&float_column(df, Property::Temperature)?)?;
    let salinity = layout.arrange(&float_column(df, Property::Salinity)?)?;

    Profile::new(pressure, temperature, salinity)
}

fn float_column(df: &DataFrame, property: Property) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(property.name())?
        .as_materialized_series()
        .strict_cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Mapping of CSV lines onto profile rows
#[derive(Debug, Clone, PartialEq)]
struct RowLayout {
    rows: Vec<Vec<usize>>,
}

impl RowLayout {
    fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let height = df.height();
        if df.get_column_index(PROFILE_INDEX_COLUMN).is_none() {
            return Ok(Self {
                rows: vec![(0..height).collect()],
            });
        }

        let index = df
            .column(PROFILE_INDEX_COLUMN)?
            .as_materialized_series()
            .strict_cast(&DataType::Int64)?;

        // rows keep the order in which their index first appears
        let mut keys: Vec<i64> = Vec::new();
        let mut rows: Vec<Vec<usize>> = Vec::new();
        for (line, key) in index.i64()?.into_iter().enumerate() {
            let key = key.ok_or_else(|| {
                QcError::configuration(format!(
                    "{PROFILE_INDEX_COLUMN} is empty on data line {}",
                    line + 1
                ))
            })?;
            match keys.iter().position(|k| *k == key) {
                Some(row) => rows[row].push(line),
                None => {
                    keys.push(key);
                    rows.push(vec![line]);
                }
            }
        }

        Ok(Self { rows })
    }

    fn shape(&self) -> Shape {
        let samples = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        Shape::new(self.rows.len(), samples)
    }

    fn arrange(&self, column: &[Option<f64>]) -> Result<PropertyData> {
        let shape = self.shape();
        let mut values = Vec::with_capacity(shape.len());
        let mut masked = Vec::with_capacity(shape.len());
        let mut padded = 0;

        for row in &self.rows {
            for line in row {
                let sample = column.get(*line).copied().flatten();
                values.push(sample.unwrap_or(f64::NAN));
                masked.push(sample.is_none());
            }
            let padding = shape.samples - row.len();
            values.extend(std::iter::repeat_n(f64::NAN, padding));
            masked.extend(std::iter::repeat_n(true, padding));
            padded += padding;
        }

        if padded > 0 {
            warn!(
                "Profile rows have unequal lengths, padded {} missing samples",
                padded
            );
        }

        PropertyData::with_mask(shape, values, masked)
    }
}

//! Check output flags
//!
//! A [`CheckOutput`] collects the flags produced by one check run over one
//! profile. Flag arrays are allocated on first touch and every assignment
//! goes through the precedence table, so a lower flag never replaces a
//! higher or incomparable one.

use crate::error::{QcError, Result};
use crate::flags::ArgoQcFlag;
use crate::profile::{Property, ProfileSource, Shape};
use std::collections::BTreeMap;

// =============================================================================
// Selection
// =============================================================================

/// Elements of a property array a flag assignment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection<'s> {
    /// Every element
    #[default]
    All,
    /// Boolean mask over the flat sample space
    Mask(&'s [bool]),
    /// Flat element indices
    Indices(&'s [usize]),
}

impl Selection<'_> {
    /// Resolve to flat indices, validating against an array of `len` elements
    pub fn indices(&self, property: Property, len: usize) -> Result<Vec<usize>> {
        match self {
            Selection::All => Ok((0..len).collect()),
            Selection::Mask(mask) => {
                if mask.len() != len {
                    return Err(QcError::SelectionMismatch {
                        property: property.to_string(),
                        expected: len,
                        found: mask.len(),
                    });
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, selected)| selected.then_some(i))
                    .collect())
            }
            Selection::Indices(indices) => {
                if let Some(&out_of_range) = indices.iter().find(|&&i| i >= len) {
                    return Err(QcError::SelectionMismatch {
                        property: property.to_string(),
                        expected: len,
                        found: out_of_range + 1,
                    });
                }
                Ok(indices.to_vec())
            }
        }
    }
}

impl<'s> From<&'s [bool]> for Selection<'s> {
    fn from(mask: &'s [bool]) -> Self {
        Selection::Mask(mask)
    }
}

impl<'s> From<&'s Vec<bool>> for Selection<'s> {
    fn from(mask: &'s Vec<bool>) -> Self {
        Selection::Mask(mask.as_slice())
    }
}

// =============================================================================
// Flag Arrays
// =============================================================================

/// Flags for every sample of one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagArray {
    shape: Shape,
    flags: Vec<ArgoQcFlag>,
}

impl FlagArray {
    /// Array of `NO_QC` flags
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            flags: vec![ArgoQcFlag::NoQc; shape.len()],
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn as_slice(&self) -> &[ArgoQcFlag] {
        &self.flags
    }

    pub fn get(&self, index: usize) -> Option<ArgoQcFlag> {
        self.flags.get(index).copied()
    }

    /// Flags of one profile row
    pub fn row(&self, row: usize) -> &[ArgoQcFlag] {
        &self.flags[self.shape.row_range(row)]
    }

    /// Number of samples holding `flag`
    pub fn count(&self, flag: ArgoQcFlag) -> usize {
        self.flags.iter().filter(|f| **f == flag).count()
    }

    /// Wire codes, one string per sample
    pub fn to_codes(&self) -> Vec<&'static str> {
        self.flags.iter().map(|f| f.as_str()).collect()
    }

    /// Replace flags at `indices` with `flag` where precedence allows.
    /// Returns the number of samples that changed.
    fn assign(&mut self, flag: ArgoQcFlag, indices: &[usize]) -> Result<usize> {
        let overridable = flag.overridable_by()?;
        let mut changed = 0;
        for &i in indices {
            if overridable.contains(&self.flags[i]) {
                self.flags[i] = flag;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

// =============================================================================
// Check Output
// =============================================================================

/// Output flags of a single check run over one profile
pub struct CheckOutput<'a> {
    profile: &'a dyn ProfileSource,
    output: BTreeMap<Property, FlagArray>,
}

impl<'a> CheckOutput<'a> {
    /// Empty output for `profile`
    pub fn new(profile: &'a dyn ProfileSource) -> Self {
        Self {
            profile,
            output: BTreeMap::new(),
        }
    }

    /// Allocate a `NO_QC` flag array for `property` if there is none yet
    pub fn ensure_property(&mut self, property: Property) -> Result<()> {
        if !self.output.contains_key(&property) {
            let shape = self.profile.get_property_data(property)?.shape();
            self.output.insert(property, FlagArray::new(shape));
        }
        Ok(())
    }

    /// [`Self::ensure_property`] for each of `properties`
    pub fn ensure_properties(&mut self, properties: &[Property]) -> Result<()> {
        for &property in properties {
            self.ensure_property(property)?;
        }
        Ok(())
    }

    /// Set `flag` on the selected samples of `property`, respecting precedence.
    ///
    /// A sample only changes if its current flag is one `flag` may overwrite.
    /// Returns the number of samples changed.
    pub fn set_flag(
        &mut self,
        property: Property,
        flag: ArgoQcFlag,
        selection: Selection<'_>,
    ) -> Result<usize> {
        self.ensure_property(property)?;
        let flags = self
            .output
            .get_mut(&property)
            .ok_or_else(|| uninitialized(property))?;
        let indices = selection.indices(property, flags.len())?;
        flags.assign(flag, &indices)
    }

    /// [`Self::set_flag`] applied to each of `properties` with one selection
    pub fn set_flag_for_many(
        &mut self,
        properties: &[Property],
        flag: ArgoQcFlag,
        selection: Selection<'_>,
    ) -> Result<usize> {
        let mut changed = 0;
        for &property in properties {
            changed += self.set_flag(property, flag, selection)?;
        }
        Ok(changed)
    }

    /// Current flags for `property`
    pub fn get_flags(&self, property: Property) -> Result<&FlagArray> {
        self.output
            .get(&property)
            .ok_or_else(|| uninitialized(property))
    }

    /// Current flags for a property given by its Argo name
    pub fn get_flags_by_name(&self, name: &str) -> Result<&FlagArray> {
        self.get_flags(name.parse()?)
    }

    /// Properties with an allocated flag array
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.output.keys().copied()
    }

    /// Fold another output's flags into this one through the precedence table
    pub fn merge_from(&mut self, other: &CheckOutput<'_>) -> Result<()> {
        for (&property, incoming) in &other.output {
            self.ensure_property(property)?;
            let current = self
                .output
                .get_mut(&property)
                .ok_or_else(|| uninitialized(property))?;
            if current.shape() != incoming.shape() {
                return Err(QcError::ShapeMismatch {
                    property: property.to_string(),
                    expected: current.shape().to_string(),
                    found: incoming.shape().to_string(),
                });
            }
            for flag in ArgoQcFlag::all_values() {
                let indices: Vec<usize> = incoming
                    .as_slice()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, f)| (*f == flag).then_some(i))
                    .collect();
                if !indices.is_empty() {
                    current.assign(flag, &indices)?;
                }
            }
        }
        Ok(())
    }

    /// Consume the output, keeping only the flag arrays
    pub fn into_flags(self) -> BTreeMap<Property, FlagArray> {
        self.output
    }
}

impl std::fmt::Debug for CheckOutput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckOutput")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

fn uninitialized(property: Property) -> QcError {
    QcError::UninitializedOutput {
        property: property.to_string(),
    }
}

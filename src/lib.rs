//! Argo Real-Time Quality Control Library
//!
//! Quality control checks for Argo float profiles of pressure (PRES),
//! temperature (TEMP) and practical salinity (PSAL).
//!
//! This library provides tools for:
//! - The Argo QC flag vocabulary and its precedence rules
//! - Per-sample flag bookkeeping that never downgrades a worse flag
//! - The global range (test 6) and pressure increasing (test 8) checks
//! - Loading profiles from CSV and reporting the merged flags
//!
//! # Example
//!
//! ```
//! use argo_rtqc::{ArgoQcFlag, Check, PressureIncreasingCheck, Profile, Property, PropertyData};
//!
//! let profile = Profile::new(
//!     PropertyData::from_values(vec![0.0, 2.0, 1.0, 5.0]),
//!     PropertyData::from_values(vec![10.0; 4]),
//!     PropertyData::from_values(vec![35.0; 4]),
//! )?;
//!
//! let output = PressureIncreasingCheck::new(&profile, None).run()?;
//! let flags = output.get_flags(Property::Pressure)?;
//! assert_eq!(flags.get(2), Some(ArgoQcFlag::Bad));
//! # Ok::<(), argo_rtqc::QcError>(())
//! ```

pub mod checks;
pub mod config;
pub mod constants;
pub mod error;
pub mod flags;
pub mod loader;
pub mod output;
pub mod profile;
pub mod report;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use checks::{
    Check, CheckInfo, CheckKind, CheckRun, GlobalRangeCheck, PressureIncreasingCheck,
    PropertyRangeCheck, RangeRule, run_checks,
};
pub use config::{GlobalRangeConfig, QcConfig};
pub use error::{QcError, Result};
pub use flags::{ArgoQcFlag, FLAG_PRECEDENCE};
pub use output::{CheckOutput, FlagArray, Selection};
pub use profile::{Profile, ProfileSequence, ProfileSource, Property, PropertyData, Shape};
pub use report::QcReport;

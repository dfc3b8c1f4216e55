//! Application constants for the Argo RTQC checker
//!
//! This module contains the Argo flag wire codes, property names, test
//! identifiers and the default thresholds from the Argo quality control manual.

// =============================================================================
// Property Names
// =============================================================================

/// Sea water pressure (decibar)
pub const PRESSURE: &str = "PRES";

/// Sea water temperature (degrees Celsius)
pub const TEMPERATURE: &str = "TEMP";

/// Practical salinity (PSU)
pub const SALINITY: &str = "PSAL";

/// All property names a profile may be asked for
pub const PROPERTY_NAMES: &[&str] = &[PRESSURE, TEMPERATURE, SALINITY];

/// Optional CSV column used to group samples into profile rows
pub const PROFILE_INDEX_COLUMN: &str = "N_PROF";

// =============================================================================
// Quality Control Flag Codes
// =============================================================================

/// Argo reference table 2 flag codes, as stored in `<PARAM>_QC` variables
pub mod flag_codes {
    /// No QC was performed
    pub const NO_QC: &[u8] = b"0";

    /// Good data
    pub const GOOD: &[u8] = b"1";

    /// Probably good data
    pub const PROBABLY_GOOD: &[u8] = b"2";

    /// Bad data that are potentially correctable
    pub const PROBABLY_BAD: &[u8] = b"3";

    /// Bad data
    pub const BAD: &[u8] = b"4";

    /// Value changed
    pub const CHANGED: &[u8] = b"5";

    // "6" and "7" are not used

    /// Estimated value
    pub const ESTIMATED: &[u8] = b"8";

    /// Missing value
    pub const MISSING: &[u8] = b"9";

    /// Fill value, no code
    pub const FILL_VALUE: &[u8] = b"";
}

// =============================================================================
// Argo Real-Time Test Identifiers
// =============================================================================

/// Global range test (Argo test 6)
pub mod global_range_test {
    pub const ARGO_ID: u32 = 6;
    pub const ARGO_BINARY_ID: u32 = 64;
    pub const ARGO_NAME: &str = "Global range test";
    pub const NVS_URI: &str = "http://vocab.nerc.ac.uk/collection/R11/current/6/";
}

/// Pressure increasing test (Argo test 8)
pub mod pressure_increasing_test {
    pub const ARGO_ID: u32 = 8;
    pub const ARGO_BINARY_ID: u32 = 256;
    pub const ARGO_NAME: &str = "Pressure increasing test";
    pub const NVS_URI: &str = "http://vocab.nerc.ac.uk/collection/R11/current/8/";
}

// =============================================================================
// Global Range Thresholds
// =============================================================================

/// Pressure below this is bad (dbar)
pub const PRESSURE_BAD_MIN: f64 = -5.0;

/// Pressure below this is probably bad (dbar)
pub const PRESSURE_PROBABLY_BAD_MIN: f64 = -2.4;

/// Temperature limits (degrees Celsius)
pub const TEMPERATURE_MIN: f64 = -2.5;
pub const TEMPERATURE_MAX: f64 = 40.0;

/// Salinity limits (PSU)
pub const SALINITY_MIN: f64 = 2.0;
pub const SALINITY_MAX: f64 = 41.0;

// =============================================================================
// Configuration
// =============================================================================

/// Environment variable that enables skipping optional checks
pub const ENV_SKIP_OPTIONAL: &str = "ARGO_RTQC_SKIP_OPTIONAL";

/// Default log level for the command-line tool
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_codes_are_single_bytes() {
        for code in [
            flag_codes::NO_QC,
            flag_codes::GOOD,
            flag_codes::PROBABLY_GOOD,
            flag_codes::PROBABLY_BAD,
            flag_codes::BAD,
            flag_codes::CHANGED,
            flag_codes::ESTIMATED,
            flag_codes::MISSING,
        ] {
            assert_eq!(code.len(), 1);
        }
        assert!(flag_codes::FILL_VALUE.is_empty());
    }

    #[test]
    fn test_binary_ids_are_powers_of_two_of_argo_ids() {
        assert_eq!(1 << global_range_test::ARGO_ID, global_range_test::ARGO_BINARY_ID);
        assert_eq!(
            1 << pressure_increasing_test::ARGO_ID,
            pressure_increasing_test::ARGO_BINARY_ID
        );
    }
}

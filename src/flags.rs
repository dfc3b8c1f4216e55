//! Argo quality control flags and their precedence
//!
//! Flags follow Argo reference table 2. Precedence is not a total order: each
//! flag lists the flags it may overwrite, and a flag never overwrites itself.

use crate::constants::flag_codes;
use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Flag Enumeration
// =============================================================================

/// Quality control flag assigned to a single sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgoQcFlag {
    /// No QC was performed
    NoQc,
    /// Good data
    Good,
    /// Probably good data
    ProbablyGood,
    /// Bad data that are potentially correctable
    ProbablyBad,
    /// Bad data
    Bad,
    /// Value changed
    Changed,
    /// Estimated value
    Estimated,
    /// Missing value
    Missing,
    /// Fill value
    FillValue,
}

impl ArgoQcFlag {
    /// Every flag, in Argo table order
    pub fn all_values() -> [ArgoQcFlag; 9] {
        [
            ArgoQcFlag::NoQc,
            ArgoQcFlag::Good,
            ArgoQcFlag::ProbablyGood,
            ArgoQcFlag::ProbablyBad,
            ArgoQcFlag::Bad,
            ArgoQcFlag::Changed,
            ArgoQcFlag::Estimated,
            ArgoQcFlag::Missing,
            ArgoQcFlag::FillValue,
        ]
    }

    /// Wire representation of this flag
    pub fn encode(self) -> &'static [u8] {
        match self {
            ArgoQcFlag::NoQc => flag_codes::NO_QC,
            ArgoQcFlag::Good => flag_codes::GOOD,
            ArgoQcFlag::ProbablyGood => flag_codes::PROBABLY_GOOD,
            ArgoQcFlag::ProbablyBad => flag_codes::PROBABLY_BAD,
            ArgoQcFlag::Bad => flag_codes::BAD,
            ArgoQcFlag::Changed => flag_codes::CHANGED,
            ArgoQcFlag::Estimated => flag_codes::ESTIMATED,
            ArgoQcFlag::Missing => flag_codes::MISSING,
            ArgoQcFlag::FillValue => flag_codes::FILL_VALUE,
        }
    }

    /// Parse a flag from its wire representation
    pub fn decode(code: &[u8]) -> Result<Self> {
        Self::all_values()
            .into_iter()
            .find(|flag| flag.encode() == code)
            .ok_or_else(|| QcError::unknown_flag(code))
    }

    /// Wire representation as text, empty for the fill value
    pub fn as_str(self) -> &'static str {
        match self {
            ArgoQcFlag::NoQc => "0",
            ArgoQcFlag::Good => "1",
            ArgoQcFlag::ProbablyGood => "2",
            ArgoQcFlag::ProbablyBad => "3",
            ArgoQcFlag::Bad => "4",
            ArgoQcFlag::Changed => "5",
            ArgoQcFlag::Estimated => "8",
            ArgoQcFlag::Missing => "9",
            ArgoQcFlag::FillValue => "",
        }
    }

    /// Single byte code, `None` for the fill value
    pub fn code(self) -> Option<u8> {
        self.encode().first().copied()
    }

    /// Flags this flag is allowed to overwrite
    pub fn overridable_by(self) -> Result<&'static [ArgoQcFlag]> {
        overridable_by(self)
    }

    /// True if this flag may replace `other` on a sample
    pub fn overrides(self, other: ArgoQcFlag) -> bool {
        self.overridable_by()
            .map(|overridable| overridable.contains(&other))
            .unwrap_or(false)
    }

    /// Human-readable description of this flag
    pub fn description(self) -> &'static str {
        match self {
            ArgoQcFlag::NoQc => "No QC performed",
            ArgoQcFlag::Good => "Good data",
            ArgoQcFlag::ProbablyGood => "Probably good data",
            ArgoQcFlag::ProbablyBad => "Probably bad data, potentially correctable",
            ArgoQcFlag::Bad => "Bad data",
            ArgoQcFlag::Changed => "Value changed",
            ArgoQcFlag::Estimated => "Estimated value",
            ArgoQcFlag::Missing => "Missing value",
            ArgoQcFlag::FillValue => "Fill value",
        }
    }

    /// Upper-case Argo vocabulary name, e.g. `PROBABLY_BAD`
    pub fn name(self) -> &'static str {
        match self {
            ArgoQcFlag::NoQc => "NO_QC",
            ArgoQcFlag::Good => "GOOD",
            ArgoQcFlag::ProbablyGood => "PROBABLY_GOOD",
            ArgoQcFlag::ProbablyBad => "PROBABLY_BAD",
            ArgoQcFlag::Bad => "BAD",
            ArgoQcFlag::Changed => "CHANGED",
            ArgoQcFlag::Estimated => "ESTIMATED",
            ArgoQcFlag::Missing => "MISSING",
            ArgoQcFlag::FillValue => "FILL_VALUE",
        }
    }
}

impl FromStr for ArgoQcFlag {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s.as_bytes())
    }
}

impl TryFrom<u8> for ArgoQcFlag {
    type Error = QcError;

    fn try_from(value: u8) -> Result<Self> {
        Self::decode(&[value])
    }
}

impl std::fmt::Display for ArgoQcFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Precedence Table
// =============================================================================

/// For each flag, the flags it may overwrite
///
/// The relation is irreflexive and deliberately not transitive: `CHANGED`
/// only replaces `NO_QC`, so it is not comparable with `PROBABLY_BAD`.
pub const FLAG_PRECEDENCE: &[(ArgoQcFlag, &[ArgoQcFlag])] = &[
    (ArgoQcFlag::NoQc, &[]),
    (ArgoQcFlag::Good, &[ArgoQcFlag::NoQc]),
    (
        ArgoQcFlag::ProbablyGood,
        &[ArgoQcFlag::NoQc, ArgoQcFlag::Good, ArgoQcFlag::Changed],
    ),
    (
        ArgoQcFlag::ProbablyBad,
        &[
            ArgoQcFlag::NoQc,
            ArgoQcFlag::Good,
            ArgoQcFlag::ProbablyGood,
            ArgoQcFlag::Changed,
        ],
    ),
    (
        ArgoQcFlag::Bad,
        &[
            ArgoQcFlag::NoQc,
            ArgoQcFlag::Good,
            ArgoQcFlag::ProbablyGood,
            ArgoQcFlag::Changed,
            ArgoQcFlag::ProbablyBad,
        ],
    ),
    (ArgoQcFlag::Changed, &[ArgoQcFlag::NoQc]),
    (
        ArgoQcFlag::Estimated,
        &[ArgoQcFlag::NoQc, ArgoQcFlag::Good, ArgoQcFlag::ProbablyGood],
    ),
    (ArgoQcFlag::Missing, &[ArgoQcFlag::NoQc]),
    (ArgoQcFlag::FillValue, &[]),
];

/// Look up the flags that `flag` may overwrite
pub fn overridable_by(flag: ArgoQcFlag) -> Result<&'static [ArgoQcFlag]> {
    FLAG_PRECEDENCE
        .iter()
        .find(|(entry, _)| *entry == flag)
        .map(|(_, overridable)| *overridable)
        .ok_or_else(|| {
            QcError::configuration(format!("no precedence entry for flag {}", flag.name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_flag_has_precedence_entry() {
        for flag in ArgoQcFlag::all_values() {
            assert!(
                overridable_by(flag).is_ok(),
                "missing precedence entry for {flag}"
            );
        }
        assert_eq!(FLAG_PRECEDENCE.len(), ArgoQcFlag::all_values().len());
    }

    #[test]
    fn test_precedence_is_irreflexive() {
        for flag in ArgoQcFlag::all_values() {
            assert!(!flag.overrides(flag), "{flag} overrides itself");
        }
    }

    #[test]
    fn test_bad_overrides_lower_flags() {
        for lower in [
            ArgoQcFlag::NoQc,
            ArgoQcFlag::Good,
            ArgoQcFlag::ProbablyGood,
            ArgoQcFlag::Changed,
            ArgoQcFlag::ProbablyBad,
        ] {
            assert!(ArgoQcFlag::Bad.overrides(lower));
        }
        assert!(!ArgoQcFlag::ProbablyBad.overrides(ArgoQcFlag::Bad));
    }

    #[test]
    fn test_precedence_is_partial() {
        // CHANGED and PROBABLY_BAD: one way only
        assert!(!ArgoQcFlag::Changed.overrides(ArgoQcFlag::ProbablyBad));
        assert!(ArgoQcFlag::ProbablyBad.overrides(ArgoQcFlag::Changed));
        assert!(!ArgoQcFlag::Good.overrides(ArgoQcFlag::ProbablyBad));
        assert!(!ArgoQcFlag::Missing.overrides(ArgoQcFlag::Good));
        assert!(!ArgoQcFlag::Estimated.overrides(ArgoQcFlag::Bad));
    }

    #[test]
    fn test_encode_codes() {
        assert_eq!(ArgoQcFlag::NoQc.encode(), b"0");
        assert_eq!(ArgoQcFlag::Bad.encode(), b"4");
        assert_eq!(ArgoQcFlag::Estimated.encode(), b"8");
        assert_eq!(ArgoQcFlag::Missing.encode(), b"9");
        assert_eq!(ArgoQcFlag::FillValue.encode(), b"");
        assert_eq!(ArgoQcFlag::ProbablyBad.code(), Some(b'3'));
        assert_eq!(ArgoQcFlag::FillValue.code(), None);
    }

    #[test]
    fn test_decode_codes() {
        assert_eq!(ArgoQcFlag::decode(b"1").unwrap(), ArgoQcFlag::Good);
        assert_eq!(ArgoQcFlag::decode(b"").unwrap(), ArgoQcFlag::FillValue);
        assert_eq!("5".parse::<ArgoQcFlag>().unwrap(), ArgoQcFlag::Changed);
        assert_eq!(ArgoQcFlag::try_from(b'2').unwrap(), ArgoQcFlag::ProbablyGood);

        // 6 and 7 are unused in the Argo table
        assert!(matches!(
            ArgoQcFlag::decode(b"6"),
            Err(QcError::UnknownFlag { .. })
        ));
        assert!(ArgoQcFlag::decode(b"7").is_err());
        assert!(ArgoQcFlag::decode(b"44").is_err());
        assert!("x".parse::<ArgoQcFlag>().is_err());
    }

    #[test]
    fn test_codes_are_unique() {
        let flags = ArgoQcFlag::all_values();
        for (i, a) in flags.iter().enumerate() {
            for b in &flags[i + 1..] {
                assert_ne!(a.encode(), b.encode());
            }
        }
    }

    #[test]
    fn test_text_codes_match_wire_codes() {
        for flag in ArgoQcFlag::all_values() {
            assert_eq!(flag.as_str().as_bytes(), flag.encode());
        }
    }

    #[test]
    fn test_display_uses_argo_names() {
        assert_eq!(ArgoQcFlag::ProbablyBad.to_string(), "PROBABLY_BAD");
        assert_eq!(ArgoQcFlag::NoQc.to_string(), "NO_QC");
    }
}

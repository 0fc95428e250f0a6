//! Validation of PHC document references against their positional encoding.
//!
//! A document reference encodes, positionally:
//!
//! ```text
//! B 24 12 01 0042
//! | |  |  |  |
//! | |  |  |  +-- 4-digit running number
//! | |  |  +----- 2-digit bank code
//! | |  +-------- 2-digit month
//! | +----------- 2-digit year suffix
//! +------------- filler character
//! ```

use serde::{Deserialize, Serialize};

/// The expected total length of a document reference, in characters.
pub const DOCUMENT_LEN: usize = 11;

// Byte offsets of the positional segments. Document references are ASCII, so
// byte and character offsets coincide; for anything else `str::get` returns
// `None` and the reference is invalid.
const YEAR_RANGE: std::ops::Range<usize> = 1..3;
const MONTH_RANGE: std::ops::Range<usize> = 3..5;
const BANK_RANGE: std::ops::Range<usize> = 5..7;
const NUMBER_RANGE: std::ops::Range<usize> = 7..11;

/// Controls how strictly document references are validated.
///
/// The length check was disabled in the legacy process; it stays off by
/// default but can be switched on per deployment through the config file.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentPolicy {
    /// When true, a reference must be exactly [`DOCUMENT_LEN`] characters.
    #[serde(default)]
    pub enforce_length: bool,
}

impl DocumentPolicy {
    /// Checks a document reference against the expected year, month and
    /// two-digit bank code.
    ///
    /// Total function: any malformed input (too short, non-ASCII segment
    /// boundaries, non-digit running number) yields `false`, never an error.
    pub fn is_valid(&self, doc: &str, year: i32, month: u32, bank_code: &str) -> bool {
        if self.enforce_length && doc.chars().count() != DOCUMENT_LEN {
            return false;
        }

        let year_suffix = format!("{:02}", year.rem_euclid(100));
        if doc.get(YEAR_RANGE) != Some(year_suffix.as_str()) {
            return false;
        }

        let month_part = format!("{month:02}");
        if doc.get(MONTH_RANGE) != Some(month_part.as_str()) {
            return false;
        }

        if doc.get(BANK_RANGE) != Some(bank_code) {
            return false;
        }

        match doc.get(NUMBER_RANGE) {
            Some(number) => number.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: DocumentPolicy = DocumentPolicy {
        enforce_length: false,
    };

    #[test]
    fn test_well_formed() {
        assert!(POLICY.is_valid("B2412010042", 2024, 12, "01"));
        assert!(POLICY.is_valid("X2505090001", 2025, 5, "09"));
    }

    #[test]
    fn test_mutating_any_segment_invalidates() {
        let doc = "B2412010042";
        assert!(POLICY.is_valid(doc, 2024, 12, "01"));
        // year
        assert!(!POLICY.is_valid("B2512010042", 2024, 12, "01"));
        // month
        assert!(!POLICY.is_valid("B2411010042", 2024, 12, "01"));
        // bank code
        assert!(!POLICY.is_valid("B2412020042", 2024, 12, "01"));
        // running number
        assert!(!POLICY.is_valid("B24120100x2", 2024, 12, "01"));
    }

    #[test]
    fn test_wrong_expectations_invalidate() {
        let doc = "B2412010042";
        assert!(!POLICY.is_valid(doc, 2023, 12, "01"));
        assert!(!POLICY.is_valid(doc, 2024, 11, "01"));
        assert!(!POLICY.is_valid(doc, 2024, 12, "02"));
    }

    #[test]
    fn test_short_and_empty_inputs_are_invalid_not_fatal() {
        assert!(!POLICY.is_valid("", 2024, 12, "01"));
        assert!(!POLICY.is_valid("B", 2024, 12, "01"));
        assert!(!POLICY.is_valid("B2412", 2024, 12, "01"));
        assert!(!POLICY.is_valid("B241201004", 2024, 12, "01"));
    }

    #[test]
    fn test_non_ascii_is_invalid_not_fatal() {
        assert!(!POLICY.is_valid("Bçã12010042", 2024, 12, "01"));
        assert!(!POLICY.is_valid("日本語のテキスト", 2024, 12, "01"));
    }

    #[test]
    fn test_year_suffix_is_last_two_digits() {
        assert!(POLICY.is_valid("B0501010042", 2105, 1, "01"));
    }

    #[test]
    fn test_month_zero_padded() {
        assert!(POLICY.is_valid("B2405010042", 2024, 5, "01"));
        assert!(!POLICY.is_valid("B245_010042", 2024, 5, "01"));
    }

    #[test]
    fn test_length_policy() {
        let strict = DocumentPolicy {
            enforce_length: true,
        };
        assert!(strict.is_valid("B2412010042", 2024, 12, "01"));
        // trailing junk passes the lenient policy but not the strict one
        assert!(POLICY.is_valid("B2412010042XX", 2024, 12, "01"));
        assert!(!strict.is_valid("B2412010042XX", 2024, 12, "01"));
    }
}

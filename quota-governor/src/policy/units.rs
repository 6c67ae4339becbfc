//! RAM size parsing.
//!
//! Plans declare RAM as a whole number followed by a two-letter, upper-case unit:
//! `"512MB"` or `"2GB"`. Fractions, separators and other spellings are rejected.

use tracing::error;

use crate::error::{GovernorError, Result};

/// Message reported for a RAM value the converter cannot read.
pub const UNSUPPORTED_PLAN: &str = "Subscription with such plan can't be added";

/// Megabytes per gigabyte.
const MB_PER_GB: u64 = 1024;

/// Unit suffix accepted in a RAM size string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    /// `MB`, passed through unchanged.
    Megabytes,
    /// `GB`, multiplied by 1024.
    Gigabytes,
}

impl SizeUnit {
    /// Suffix as written in the subscription property.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Megabytes => "MB",
            Self::Gigabytes => "GB",
        }
    }

    const fn multiplier(self) -> u64 {
        match self {
            Self::Megabytes => 1,
            Self::Gigabytes => MB_PER_GB,
        }
    }

    /// Splits a size string into its numeric prefix and unit.
    fn split(size: &str) -> Option<(&str, Self)> {
        [Self::Gigabytes, Self::Megabytes]
            .into_iter()
            .find_map(|unit| size.strip_suffix(unit.suffix()).map(|digits| (digits, unit)))
    }
}

/// Converts a RAM size string to megabytes.
///
/// # Errors
///
/// Returns `GovernorError::Conflict` if the suffix is not exactly `GB` or `MB`, if the
/// prefix is not an unsigned integer, or if the result overflows. The rejected value is
/// logged.
///
/// # Examples
///
/// ```
/// use quota_governor::policy::to_megabytes;
///
/// assert_eq!(to_megabytes("2GB").unwrap(), 2048);
/// assert_eq!(to_megabytes("512MB").unwrap(), 512);
/// assert!(to_megabytes("5TB").is_err());
/// assert!(to_megabytes("2gb").is_err());
/// ```
pub fn to_megabytes(size: &str) -> Result<u64> {
    let Some((digits, unit)) = SizeUnit::split(size) else {
        return Err(reject(size));
    };
    digits
        .parse::<u64>()
        .ok()
        .and_then(|value| value.checked_mul(unit.multiplier()))
        .ok_or_else(|| reject(size))
}

fn reject(size: &str) -> GovernorError {
    error!(ram = %size, "Bad RAM value");
    GovernorError::Conflict(UNSUPPORTED_PLAN.to_owned())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_gigabytes_are_multiplied() {
        assert_eq!(to_megabytes("2GB").unwrap(), 2048);
        assert_eq!(to_megabytes("1GB").unwrap(), 1024);
    }

    #[test]
    fn test_megabytes_pass_through() {
        assert_eq!(to_megabytes("512MB").unwrap(), 512);
    }

    #[test]
    fn test_zero_is_accepted() {
        assert_eq!(to_megabytes("0GB").unwrap(), 0);
    }

    #[test]
    fn test_unknown_suffix_rejected() {
        let err = to_megabytes("5TB").unwrap_err();
        assert_eq!(err, GovernorError::Conflict(UNSUPPORTED_PLAN.to_owned()));
    }

    #[test]
    fn test_non_numeric_prefix_rejected() {
        assert!(matches!(to_megabytes("xGB"), Err(GovernorError::Conflict(_))));
    }

    #[test]
    fn test_malformed_values_rejected() {
        let inputs =
            ["", "G", "GB", "MB", "2gb", "2Gb", "1.5GB", "1,024MB", "-1GB", " 2GB", "2 GB"];
        for input in inputs {
            assert!(
                matches!(to_megabytes(input), Err(GovernorError::Conflict(_))),
                "expected conflict for {input:?}"
            );
        }
    }

    #[test]
    fn test_overflow_rejected() {
        let huge = format!("{}GB", u64::MAX);
        assert!(matches!(to_megabytes(&huge), Err(GovernorError::Conflict(_))));
    }

    proptest! {
        #[test]
        fn test_gigabytes_scale_by_1024(value in 0u64..=1_000_000) {
            prop_assert_eq!(to_megabytes(&format!("{value}GB")).unwrap(), value * 1024);
        }

        #[test]
        fn test_megabytes_round_trip(value in any::<u64>()) {
            prop_assert_eq!(to_megabytes(&format!("{value}MB")).unwrap(), value);
        }

        #[test]
        fn test_other_suffixes_never_parse(value in 0u64..=4096, suffix in "[A-Za-z]{2}") {
            prop_assume!(suffix != "GB" && suffix != "MB");
            let input = format!("{value}{suffix}");
            prop_assert!(to_megabytes(&input).is_err());
        }
    }
}

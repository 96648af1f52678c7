//! Business-value comparison policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a current value is matched against its archived value.
///
/// Digests are never compared through this type; they always require
/// byte equality (see `checksum::digests_match`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparison {
    /// Values must be exactly equal.
    #[default]
    Exact,
    /// Values match when `|current - expected| < tolerance`.
    Tolerant,
}

impl Comparison {
    /// Returns true if `current` matches `expected` under this policy.
    ///
    /// `tolerance` is ignored for [`Comparison::Exact`].
    #[must_use]
    pub fn values_match(self, current: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
        match self {
            Self::Exact => current == expected,
            Self::Tolerant => current
                .checked_sub(expected)
                .is_some_and(|diff| diff.abs() < tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_requires_equality() {
        assert!(Comparison::Exact.values_match(dec!(100.00), dec!(100), dec!(0.01)));
        assert!(!Comparison::Exact.values_match(dec!(100.001), dec!(100), dec!(0.01)));
    }

    #[test]
    fn test_tolerant_is_strictly_less_than() {
        let tol = dec!(0.01);
        assert!(Comparison::Tolerant.values_match(dec!(100.009), dec!(100), tol));
        assert!(Comparison::Tolerant.values_match(dec!(99.991), dec!(100), tol));
        assert!(!Comparison::Tolerant.values_match(dec!(100.01), dec!(100), tol));
        assert!(!Comparison::Tolerant.values_match(dec!(99.99), dec!(100), tol));
    }

    #[test]
    fn test_tolerant_overflow_does_not_match() {
        assert!(!Comparison::Tolerant.values_match(Decimal::MIN, Decimal::MAX, dec!(0.01)));
    }
}

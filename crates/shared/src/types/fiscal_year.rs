//! Fiscal (profit) year.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A fiscal year, as the archive keys it.
///
/// Serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct FiscalYear(i16);

impl FiscalYear {
    /// Earliest accepted year.
    pub const MIN: i16 = 1900;
    /// Latest accepted year.
    pub const MAX: i16 = 9999;

    /// Creates a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the year is outside `MIN..=MAX`.
    pub fn new(year: i16) -> Result<Self, AppError> {
        if (Self::MIN..=Self::MAX).contains(&year) {
            Ok(Self(year))
        } else {
            Err(AppError::validation(format!(
                "fiscal year {year} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Returns the raw year.
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for FiscalYear {
    type Error = AppError;

    fn try_from(year: i16) -> Result<Self, Self::Error> {
        Self::new(year)
    }
}

impl From<FiscalYear> for i16 {
    fn from(year: FiscalYear) -> Self {
        year.0
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1900)]
    #[case(2024)]
    #[case(9999)]
    fn test_accepts_in_range(#[case] year: i16) {
        assert_eq!(FiscalYear::new(year).unwrap().value(), year);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(1899)]
    #[case(10_000)]
    fn test_rejects_out_of_range(#[case] year: i16) {
        assert!(matches!(
            FiscalYear::new(year),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_serde_is_bare_integer() {
        let year = FiscalYear::new(2024).unwrap();
        assert_eq!(serde_json::to_string(&year).unwrap(), "2024");
        let back: FiscalYear = serde_json::from_str("2024").unwrap();
        assert_eq!(back, year);
        assert!(serde_json::from_str::<FiscalYear>("12").is_err());
    }
}

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How cumulative performance is built from individual returns.
///
/// This is explicit configuration, never inferred from the data: the same
/// return sequence produces a different cumulative curve, drawdown and
/// annualization under each convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingMode {
    /// Cumulative value is the running sum of returns. Used for per-trade
    /// ROI reporting where returns are small and non-overlapping.
    Additive,
    /// Cumulative value is the running product of `(1 + return)`. Used for
    /// period-over-period compounding such as monthly returns.
    Multiplicative,
}

impl fmt::Display for CompoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundingMode::Additive => write!(f, "additive"),
            CompoundingMode::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

impl FromStr for CompoundingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "additive" => Ok(CompoundingMode::Additive),
            "multiplicative" => Ok(CompoundingMode::Multiplicative),
            other => Err(CoreError::InvalidInput(
                "compounding mode".to_string(),
                format!("'{other}' is not 'additive' or 'multiplicative'"),
            )),
        }
    }
}

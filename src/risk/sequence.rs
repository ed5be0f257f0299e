//! Reverse-Fibonacci daily risk ceilings

use super::RiskError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Daily capital-at-risk ceilings indexed by consecutive loss days
///
/// Index 0 is the full allowance; each further losing day steps down the
/// table until the last element, which acts as the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Decimal>", into = "Vec<Decimal>")]
pub struct RiskLimitSequence {
    limits: Vec<Decimal>,
}

impl RiskLimitSequence {
    /// Create a sequence, rejecting empty, non-positive or increasing tables
    pub fn new(limits: Vec<Decimal>) -> Result<Self, RiskError> {
        if limits.is_empty() {
            return Err(RiskError::InvalidSequence(
                "sequence must contain at least one limit".to_string(),
            ));
        }

        if let Some(bad) = limits.iter().find(|l| **l <= dec!(0)) {
            return Err(RiskError::InvalidSequence(format!(
                "limits must be positive, got {}",
                bad
            )));
        }

        if let Some(pair) = limits.windows(2).find(|w| w[1] > w[0]) {
            return Err(RiskError::InvalidSequence(format!(
                "limits must be non-increasing, {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { limits })
    }

    /// Ceiling for the given streak; past the end of the table the floor applies
    pub fn limit_for(&self, consecutive_loss_days: u32) -> Decimal {
        let idx = (consecutive_loss_days as usize).min(self.limits.len() - 1);
        self.limits[idx]
    }

    /// Largest ceiling (no losing streak)
    pub fn initial_limit(&self) -> Decimal {
        self.limits[0]
    }

    /// Smallest ceiling the sequence bottoms out at
    pub fn floor_limit(&self) -> Decimal {
        self.limits[self.limits.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn as_slice(&self) -> &[Decimal] {
        &self.limits
    }
}

impl Default for RiskLimitSequence {
    fn default() -> Self {
        Self {
            limits: vec![dec!(500), dec!(300), dec!(200), dec!(100)],
        }
    }
}

impl TryFrom<Vec<Decimal>> for RiskLimitSequence {
    type Error = RiskError;

    fn try_from(limits: Vec<Decimal>) -> Result<Self, Self::Error> {
        Self::new(limits)
    }
}

impl From<RiskLimitSequence> for Vec<Decimal> {
    fn from(sequence: RiskLimitSequence) -> Self {
        sequence.limits
    }
}

//! GoScore policy: factor weights, decision thresholds and overrides

use super::{Factor, Regime, StrategyKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Allowed drift of a weight set's sum away from 1
const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.001);

/// Policy loading and validation errors
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid thresholds for {context}: full={full}, half={half} (need 0 <= half < full <= 100)")]
    InvalidThresholds {
        context: String,
        full: Decimal,
        half: Decimal,
    },
    #[error("Invalid weights for {context}: {reason}")]
    InvalidWeights { context: String, reason: String },
    #[error("Override #{0} must name a regime, a strategy, or both")]
    EmptyOverride(usize),
    #[error("Failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read policy: {0}")]
    Io(#[from] std::io::Error),
}

/// Weight per factor; a valid set sums to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorWeights {
    pub poe: Decimal,
    pub pot: Decimal,
    pub edge: Decimal,
    pub liq_score: Decimal,
    pub reg_score: Decimal,
    pub pin_score: Decimal,
    pub rfib_util: Decimal,
}

impl FactorWeights {
    pub fn get(&self, factor: Factor) -> Decimal {
        match factor {
            Factor::PoE => self.poe,
            Factor::PoT => self.pot,
            Factor::Edge => self.edge,
            Factor::LiqScore => self.liq_score,
            Factor::RegScore => self.reg_score,
            Factor::PinScore => self.pin_score,
            Factor::RfibUtil => self.rfib_util,
        }
    }

    pub fn sum(&self) -> Decimal {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    fn validate(&self, context: &str) -> Result<(), PolicyError> {
        if let Some(factor) = Factor::ALL.iter().find(|f| self.get(**f) < dec!(0)) {
            return Err(PolicyError::InvalidWeights {
                context: context.to_string(),
                reason: format!("{} weight is negative ({})", factor, self.get(*factor)),
            });
        }

        let sum = self.sum();
        if (sum - dec!(1)).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PolicyError::InvalidWeights {
                context: context.to_string(),
                reason: format!("weights sum to {}, expected 1", sum),
            });
        }

        Ok(())
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            poe: dec!(0.25),
            pot: dec!(0.15),
            edge: dec!(0.20),
            liq_score: dec!(0.10),
            reg_score: dec!(0.10),
            pin_score: dec!(0.10),
            rfib_util: dec!(0.10),
        }
    }
}

/// Score cut-offs on the 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Scores at or above this trade full size
    pub full: Decimal,
    /// Scores at or above this (and below `full`) trade half size
    pub half: Decimal,
}

impl Thresholds {
    fn validate(&self, context: &str) -> Result<(), PolicyError> {
        let in_range = |x: Decimal| x >= dec!(0) && x <= dec!(100);
        if !(in_range(self.full) && in_range(self.half) && self.half < self.full) {
            return Err(PolicyError::InvalidThresholds {
                context: context.to_string(),
                full: self.full,
                half: self.half,
            });
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            full: dec!(70),
            half: dec!(55),
        }
    }
}

/// Weights and/or thresholds applied to a regime, a strategy, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverride {
    #[serde(default)]
    pub regime: Option<Regime>,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
    #[serde(default)]
    pub weights: Option<FactorWeights>,
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

impl PolicyOverride {
    /// Match strength: 0 = no match, 1 = strategy, 2 = regime, 3 = both
    fn specificity(&self, strategy: StrategyKind, regime: Regime) -> u8 {
        let regime_score = match self.regime {
            Some(r) if r == regime => 2,
            Some(_) => return 0,
            None => 0,
        };
        let strategy_score = match self.strategy {
            Some(s) if s == strategy => 1,
            Some(_) => return 0,
            None => 0,
        };
        regime_score + strategy_score
    }
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GoPolicy {
    #[serde(default)]
    pub weights: FactorWeights,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub overrides: Vec<PolicyOverride>,
}

impl GoPolicy {
    /// Parse and validate a JSON policy
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: GoPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load and validate a JSON policy file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check every weight set and threshold pair
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.weights.validate("default policy")?;
        self.thresholds.validate("default policy")?;

        for (idx, o) in self.overrides.iter().enumerate() {
            if o.regime.is_none() && o.strategy.is_none() {
                return Err(PolicyError::EmptyOverride(idx));
            }
            let context = format!("override #{}", idx);
            if let Some(weights) = &o.weights {
                weights.validate(&context)?;
            }
            if let Some(thresholds) = &o.thresholds {
                thresholds.validate(&context)?;
            }
        }

        Ok(())
    }

    /// Weights in force for a strategy in a regime
    pub fn weights_for(&self, strategy: StrategyKind, regime: Regime) -> &FactorWeights {
        self.most_specific(strategy, regime, |o| o.weights.as_ref())
            .unwrap_or(&self.weights)
    }

    /// Thresholds in force for a strategy in a regime
    pub fn thresholds_for(&self, strategy: StrategyKind, regime: Regime) -> &Thresholds {
        self.most_specific(strategy, regime, |o| o.thresholds.as_ref())
            .unwrap_or(&self.thresholds)
    }

    fn most_specific<'a, T>(
        &'a self,
        strategy: StrategyKind,
        regime: Regime,
        field: impl Fn(&'a PolicyOverride) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let mut best: Option<(u8, &'a T)> = None;
        for o in &self.overrides {
            let specificity = o.specificity(strategy, regime);
            if specificity == 0 {
                continue;
            }
            if let Some(value) = field(o) {
                if best.map_or(true, |(s, _)| specificity > s) {
                    best = Some((specificity, value));
                }
            }
        }
        best.map(|(_, value)| value)
    }
}

//! GoScore types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Thresholds;

/// Normalized signals about a candidate trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoInputs {
    /// Probability of expiring profitable (0-1)
    pub poe: Decimal,
    /// Probability of touching the tail/stop level (0-1)
    pub pot: Decimal,
    /// Expected value estimate (roughly -1..1)
    pub edge: Decimal,
    /// Liquidity quality (0-1)
    pub liq_score: Decimal,
    /// Regime fit (0-1)
    pub reg_score: Decimal,
    /// Pin risk, higher is safer (0-1)
    pub pin_score: Decimal,
    /// Share of today's risk budget already used (0-1+)
    pub rfib_util: Decimal,
}

impl GoInputs {
    /// Raw value for a factor
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

    /// Replace the utilization with the live value from the risk budget
    pub fn with_rfib_util(mut self, rfib_util: Decimal) -> Self {
        self.rfib_util = rfib_util;
        self
    }
}

/// The seven scored factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    #[serde(rename = "poe")]
    PoE,
    #[serde(rename = "pot")]
    PoT,
    Edge,
    LiqScore,
    RegScore,
    PinScore,
    RfibUtil,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::PoE,
        Factor::PoT,
        Factor::Edge,
        Factor::LiqScore,
        Factor::RegScore,
        Factor::PinScore,
        Factor::RfibUtil,
    ];

    /// Whether a higher raw value lowers the score
    pub fn is_penalty(self) -> bool {
        matches!(self, Factor::PoT | Factor::RfibUtil)
    }

    /// Map a raw value onto 0..1, inverting penalties
    ///
    /// Inputs saturate at the ends of their range: Edge outside `[-1, 1]`
    /// and every other factor outside `[0, 1]` score the same as the bound.
    /// RfibUtil above 1 (a day already over its ceiling) therefore adds
    /// nothing further, and the budget check rejects such orders anyway.
    pub fn normalize(self, raw: Decimal) -> Decimal {
        let unit = |x: Decimal| x.max(dec!(0)).min(dec!(1));
        match self {
            Factor::PoT | Factor::RfibUtil => dec!(1) - unit(raw),
            Factor::Edge => (raw.max(dec!(-1)).min(dec!(1)) + dec!(1)) / dec!(2),
            _ => unit(raw),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Factor::PoE => "PoE",
            Factor::PoT => "PoT",
            Factor::Edge => "Edge",
            Factor::LiqScore => "LiqScore",
            Factor::RegScore => "RegScore",
            Factor::PinScore => "PinScore",
            Factor::RfibUtil => "RfibUtil",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse market condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Low volatility, range-bound
    Calm,
    /// Neither calm nor stressed
    Mixed,
    /// High volatility, trending or gapping
    Convex,
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Ok(Self::Calm),
            "mixed" => Ok(Self::Mixed),
            "convex" => Ok(Self::Convex),
            _ => Err(format!("unknown regime: {}", s)),
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Calm => "calm",
            Self::Mixed => "mixed",
            Self::Convex => "convex",
        };
        f.write_str(s)
    }
}

/// Structure of the candidate trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    CreditSpread,
    IronCondor,
    BrokenWingButterfly,
    TailOverlay,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "credit_spread" | "spread" => Ok(Self::CreditSpread),
            "iron_condor" | "ic" => Ok(Self::IronCondor),
            "broken_wing_butterfly" | "bwb" => Ok(Self::BrokenWingButterfly),
            "tail_overlay" | "overlay" => Ok(Self::TailOverlay),
            _ => Err(format!("unknown strategy kind: {}", s)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreditSpread => "credit_spread",
            Self::IronCondor => "iron_condor",
            Self::BrokenWingButterfly => "broken_wing_butterfly",
            Self::TailOverlay => "tail_overlay",
        };
        f.write_str(s)
    }
}

/// Admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Full,
    Half,
    Skip,
}

impl Decision {
    /// Size multiplier applied to the candidate
    pub fn size_multiplier(self) -> Decimal {
        match self {
            Decision::Full => dec!(1),
            Decision::Half => dec!(0.5),
            Decision::Skip => dec!(0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Full => "full",
            Decision::Half => "half",
            Decision::Skip => "skip",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One factor's share of the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: Factor,
    pub raw: Decimal,
    /// 0..1 after clamping and inversion
    pub normalized: Decimal,
    pub weight: Decimal,
    /// weight x normalized x 100
    pub contribution: Decimal,
}

/// Scoring result kept for audit and parameter search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoScoreBreakdown {
    pub strategy: StrategyKind,
    pub regime: Regime,
    pub contributions: Vec<FactorContribution>,
    pub final_score: Decimal,
    pub thresholds: Thresholds,
    pub decision: Decision,
}

impl GoScoreBreakdown {
    /// Contribution of a single factor
    pub fn contribution(&self, factor: Factor) -> Option<Decimal> {
        self.contributions
            .iter()
            .find(|c| c.factor == factor)
            .map(|c| c.contribution)
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = format!(
            "\nGOSCORE  {} / {}\n───────────────────────────────────────────────\n",
            self.strategy, self.regime
        );
        for c in &self.contributions {
            out.push_str(&format!(
                "{:<10} raw {:>7.3}  norm {:>5.3}  w {:>5.3}  = {:>6.2}\n",
                c.factor.name(),
                c.raw,
                c.normalized,
                c.weight,
                c.contribution
            ));
        }
        out.push_str(&format!(
            "───────────────────────────────────────────────\nScore:    {:.2}  (full >= {}, half >= {})\nDecision: {}\n",
            self.final_score, self.thresholds.full, self.thresholds.half, self.decision
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_positive_factors() {
        assert_eq!(Factor::PoE.normalize(dec!(0.85)), dec!(0.85));
        assert_eq!(Factor::LiqScore.normalize(dec!(1.4)), dec!(1));
        assert_eq!(Factor::PinScore.normalize(dec!(-0.2)), dec!(0));
    }

    #[test]
    fn test_normalize_penalties_invert() {
        assert_eq!(Factor::PoT.normalize(dec!(0.05)), dec!(0.95));
        assert_eq!(Factor::RfibUtil.normalize(dec!(0.3)), dec!(0.7));
        assert_eq!(Factor::RfibUtil.normalize(dec!(1.2)), dec!(0));
        assert!(Factor::PoT.is_penalty());
        assert!(!Factor::Edge.is_penalty());
    }

    #[test]
    fn test_normalize_edge_centered() {
        assert_eq!(Factor::Edge.normalize(dec!(0)), dec!(0.5));
        assert_eq!(Factor::Edge.normalize(dec!(0.15)), dec!(0.575));
        assert_eq!(Factor::Edge.normalize(dec!(-0.10)), dec!(0.45));
        assert_eq!(Factor::Edge.normalize(dec!(-3)), dec!(0));
        assert_eq!(Factor::Edge.normalize(Decimal::MAX), dec!(1));
        assert_eq!(Factor::Edge.normalize(Decimal::MIN), dec!(0));
    }

    #[test]
    fn test_regime_parse() {
        assert_eq!("Calm".parse::<Regime>().unwrap(), Regime::Calm);
        assert_eq!(" convex ".parse::<Regime>().unwrap(), Regime::Convex);
        assert!("volatile".parse::<Regime>().is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("iron-condor".parse::<StrategyKind>().unwrap(), StrategyKind::IronCondor);
        assert_eq!("BWB".parse::<StrategyKind>().unwrap(), StrategyKind::BrokenWingButterfly);
        assert!("straddle".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_decision_multiplier() {
        assert_eq!(Decision::Full.size_multiplier(), dec!(1));
        assert_eq!(Decision::Half.size_multiplier(), dec!(0.5));
        assert_eq!(Decision::Skip.size_multiplier(), dec!(0));
    }

    #[test]
    fn test_inputs_get_all_factors() {
        let inputs = GoInputs {
            poe: dec!(0.1),
            pot: dec!(0.2),
            edge: dec!(0.3),
            liq_score: dec!(0.4),
            reg_score: dec!(0.5),
            pin_score: dec!(0.6),
            rfib_util: dec!(0.7),
        };
        let values: Vec<Decimal> = Factor::ALL.iter().map(|f| inputs.get(*f)).collect();
        assert_eq!(
            values,
            vec![dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.4), dec!(0.5), dec!(0.6), dec!(0.7)]
        );
        assert_eq!(inputs.with_rfib_util(dec!(0.9)).rfib_util, dec!(0.9));
    }
}

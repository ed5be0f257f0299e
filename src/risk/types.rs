//! Risk management types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Risk management errors
#[derive(Debug, Error)]
pub enum RiskError {
    /// Limit sequence is empty, non-positive or increasing
    #[error("Invalid risk limit sequence: {0}")]
    InvalidSequence(String),
    /// Day advanced backwards
    #[error("Trading day out of order: {requested} is before {current}")]
    DayOutOfOrder {
        current: NaiveDate,
        requested: NaiveDate,
    },
    /// Other invalid configuration value
    #[error("Invalid risk configuration: {0}")]
    InvalidConfig(String),
}

/// A trade proposed by the strategy engine, before admission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateOrder {
    /// Credit collected when opening
    pub net_credit: Decimal,
    /// Worst-case loss if the position goes fully against us
    pub max_potential_loss: Decimal,
    /// Credit over capital at risk
    #[serde(default)]
    pub return_on_capital: Decimal,
    /// Strategy's own estimate of budget utilization
    #[serde(default)]
    pub rfib_utilization_hint: Decimal,
    /// Why the strategy proposed it
    #[serde(default)]
    pub reason: String,
}

impl CandidateOrder {
    /// Create a candidate; return on capital is derived from credit and max loss
    pub fn new(
        net_credit: Decimal,
        max_potential_loss: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        let return_on_capital = if max_potential_loss > dec!(0) {
            net_credit / max_potential_loss
        } else {
            dec!(0)
        };

        Self {
            net_credit,
            max_potential_loss,
            return_on_capital,
            rfib_utilization_hint: dec!(0),
            reason: reason.into(),
        }
    }

    /// Same trade at half size
    ///
    /// Return on capital is a ratio and does not change.
    pub fn halved(&self) -> Self {
        Self {
            net_credit: self.net_credit * dec!(0.5),
            max_potential_loss: self.max_potential_loss * dec!(0.5),
            return_on_capital: self.return_on_capital,
            rfib_utilization_hint: self.rfib_utilization_hint,
            reason: format!("{} (half size)", self.reason),
        }
    }
}

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Flattened at the end of the session
    #[serde(alias = "Day end")]
    DayEnd,
    /// Stop level breached
    #[serde(alias = "Stop loss")]
    StopLoss,
    /// Profit target reached
    #[serde(alias = "Profit target")]
    ProfitTarget,
    /// Expired worthless or settled
    #[serde(alias = "Expiration", alias = "Expired")]
    Expiration,
    /// Operator closed it
    #[serde(alias = "Manual")]
    Manual,
}

impl FromStr for ExitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "day_end" | "dayend" => Ok(Self::DayEnd),
            "stop_loss" | "stoploss" | "stop" => Ok(Self::StopLoss),
            "profit_target" | "target" => Ok(Self::ProfitTarget),
            "expiration" | "expired" | "expiry" => Ok(Self::Expiration),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("unknown exit reason: {}", s)),
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DayEnd => "Day end",
            Self::StopLoss => "Stop loss",
            Self::ProfitTarget => "Profit target",
            Self::Expiration => "Expiration",
            Self::Manual => "Manual",
        };
        f.write_str(s)
    }
}

/// An execution reported back by the strategy engine
///
/// Entries (`exit_reason == None`) consume daily risk; exits only realize P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub execution_date: NaiveDate,
    #[serde(default)]
    pub pnl: Decimal,
    #[serde(default)]
    pub max_potential_loss: Decimal,
    #[serde(default)]
    pub exit_reason: Option<ExitReason>,
    #[serde(default)]
    pub strategy_name: String,
    /// Budget utilization before this record, filled in when recorded
    #[serde(default)]
    pub utilization: Option<Decimal>,
}

impl ExecutionRecord {
    /// A new risk-taking entry
    pub fn entry(
        execution_date: NaiveDate,
        max_potential_loss: Decimal,
        strategy_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_date,
            pnl: dec!(0),
            max_potential_loss,
            exit_reason: None,
            strategy_name: strategy_name.into(),
            utilization: None,
        }
    }

    /// A close realizing `pnl`
    pub fn exit(
        execution_date: NaiveDate,
        pnl: Decimal,
        exit_reason: ExitReason,
        strategy_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_date,
            pnl,
            max_potential_loss: dec!(0),
            exit_reason: Some(exit_reason),
            strategy_name: strategy_name.into(),
            utilization: None,
        }
    }

    /// Set realized P&L (for entries that settle in the same record)
    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = pnl;
        self
    }

    /// Whether this record closes a position rather than opening risk
    pub fn is_exit(&self) -> bool {
        self.exit_reason.is_some()
    }
}

/// Verdict on a candidate order against the daily budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_allowed: bool,
    pub daily_limit: Decimal,
    pub current_usage_before_order: Decimal,
    pub utilization_after_order: Decimal,
    /// Advisory only, never blocks
    pub warning_level: bool,
    pub reason: String,
}

impl ValidationResult {
    pub(crate) fn denied(
        daily_limit: Decimal,
        current_usage: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        let utilization = if daily_limit > dec!(0) {
            current_usage.checked_div(daily_limit).unwrap_or(Decimal::MAX)
        } else {
            dec!(0)
        };

        Self {
            is_allowed: false,
            daily_limit,
            current_usage_before_order: current_usage,
            utilization_after_order: utilization,
            warning_level: false,
            reason: reason.into(),
        }
    }
}

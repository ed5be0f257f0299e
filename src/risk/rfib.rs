//! Reverse-Fibonacci daily risk manager
//!
//! Tracks capital committed per trading day against a ceiling that shrinks
//! with every consecutive losing day and resets after a strong winning day.

use super::{CandidateOrder, ExecutionRecord, RiskError, RiskLimitSequence, ValidationResult};
use crate::telemetry;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const REASON_EXCEEDS_LIMIT: &str = "exceeds daily limit";
pub const REASON_APPROACHING_LIMIT: &str = "approaching daily limit";
pub const REASON_NO_DAY_OPEN: &str = "no trading day open";
pub const REASON_INVALID_LOSS: &str = "invalid max potential loss";

/// RFib configuration (`[rfib]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RFibConfig {
    /// Daily ceilings by consecutive loss days
    #[serde(default)]
    pub sequence: RiskLimitSequence,
    /// Day profit strictly above this resets the loss streak
    #[serde(default = "default_reset_profit_threshold")]
    pub reset_profit_threshold: Decimal,
    /// Utilization at or above this flags a warning
    #[serde(default = "default_warning_utilization")]
    pub warning_utilization: Decimal,
}

fn default_reset_profit_threshold() -> Decimal {
    dec!(150)
}
fn default_warning_utilization() -> Decimal {
    dec!(0.90)
}

impl Default for RFibConfig {
    fn default() -> Self {
        Self {
            sequence: RiskLimitSequence::default(),
            reset_profit_threshold: dec!(150),
            warning_utilization: dec!(0.90),
        }
    }
}

impl RFibConfig {
    /// Check values the sequence type cannot enforce on its own
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.reset_profit_threshold < dec!(0) {
            return Err(RiskError::InvalidConfig(format!(
                "reset_profit_threshold must be >= 0, got {}",
                self.reset_profit_threshold
            )));
        }
        if self.warning_utilization <= dec!(0) || self.warning_utilization > dec!(1) {
            return Err(RiskError::InvalidConfig(format!(
                "warning_utilization must be in (0, 1], got {}",
                self.warning_utilization
            )));
        }
        Ok(())
    }
}

/// Mutable state for the open trading day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRiskState {
    pub date: NaiveDate,
    pub consecutive_loss_days_at_start: u32,
    pub daily_limit: Decimal,
    pub risk_used: Decimal,
    pub day_pnl: Decimal,
}

impl DailyRiskState {
    /// Share of the ceiling committed; saturates instead of overflowing
    pub fn utilization(&self) -> Decimal {
        self.risk_used
            .checked_div(self.daily_limit)
            .unwrap_or(Decimal::MAX)
    }
}

/// A closed trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHistoryRecord {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub risk_used: Decimal,
    pub consecutive_loss_days_at_start: u32,
    pub daily_limit: Decimal,
}

/// Read-only snapshot of the manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStatus {
    /// Open day, `None` between days
    pub date: Option<NaiveDate>,
    pub consecutive_loss_days: u32,
    pub daily_limit: Decimal,
    pub risk_used: Decimal,
    pub remaining_capacity: Decimal,
    pub current_utilization: Decimal,
    pub day_pnl: Decimal,
    pub total_days_tracked: usize,
}

/// Loss streak after a day closing with `day_pnl`
///
/// A day above the reset threshold clears the streak, any loss extends it,
/// and a small profit leaves it where it was.
pub fn next_loss_streak(streak: u32, day_pnl: Decimal, reset_profit_threshold: Decimal) -> u32 {
    if day_pnl > reset_profit_threshold {
        0
    } else if day_pnl < dec!(0) {
        streak.saturating_add(1)
    } else {
        streak
    }
}

/// Daily risk budget owner
///
/// One instance per trading process or backtest run. All mutation goes
/// through `&mut self`, so updates to a day's totals are serialized.
#[derive(Debug, Clone)]
pub struct RFibManager {
    config: RFibConfig,
    consecutive_loss_days: u32,
    current_day: Option<DailyRiskState>,
    history: Vec<DayHistoryRecord>,
}

impl RFibManager {
    /// Create a manager with no day open and no losing streak
    pub fn new(config: RFibConfig) -> Self {
        Self {
            config,
            consecutive_loss_days: 0,
            current_day: None,
            history: vec![],
        }
    }

    /// Create from config, validating it first
    pub fn from_config(config: &RFibConfig) -> Result<Self, RiskError> {
        config.validate()?;
        Ok(Self::new(config.clone()))
    }

    pub fn config(&self) -> &RFibConfig {
        &self.config
    }

    /// Close the open day (if it is a different date) and open `date`
    ///
    /// Calling again with the open date is a no-op. Dates must move forward.
    pub fn start_new_trading_day(&mut self, date: NaiveDate) -> Result<(), RiskError> {
        self.check_order(date)?;

        if matches!(&self.current_day, Some(day) if day.date == date) {
            tracing::debug!(%date, "Trading day already open");
            return Ok(());
        }

        self.open_day(date);
        Ok(())
    }

    /// Close the open day, apply the streak transition and record it
    ///
    /// Returns `None` if no day was open.
    pub fn close_trading_day(&mut self) -> Option<DayHistoryRecord> {
        let day = self.current_day.take()?;

        let previous = self.consecutive_loss_days;
        self.consecutive_loss_days =
            next_loss_streak(previous, day.day_pnl, self.config.reset_profit_threshold);

        let record = DayHistoryRecord {
            date: day.date,
            pnl: day.day_pnl,
            risk_used: day.risk_used,
            consecutive_loss_days_at_start: day.consecutive_loss_days_at_start,
            daily_limit: day.daily_limit,
        };

        tracing::info!(
            date = %record.date,
            pnl = %record.pnl,
            risk_used = %record.risk_used,
            loss_days_before = previous,
            loss_days_after = self.consecutive_loss_days,
            "Trading day closed"
        );

        self.history.push(record.clone());
        self.publish_metrics();
        Some(record)
    }

    /// Check a candidate against today's remaining budget
    ///
    /// Does not reserve anything; call `record_execution` once it fills.
    pub fn validate_order(&self, order: &CandidateOrder) -> ValidationResult {
        let Some(day) = &self.current_day else {
            tracing::warn!("Order validated with no trading day open");
            return ValidationResult::denied(self.next_daily_limit(), dec!(0), REASON_NO_DAY_OPEN);
        };

        if order.max_potential_loss < dec!(0) {
            tracing::warn!(
                max_potential_loss = %order.max_potential_loss,
                "Rejecting order with negative max potential loss"
            );
            return ValidationResult::denied(day.daily_limit, day.risk_used, REASON_INVALID_LOSS);
        }

        let projected = day.risk_used.checked_add(order.max_potential_loss);
        let utilization = projected.and_then(|p| p.checked_div(day.daily_limit));
        let (Some(projected), Some(utilization_after_order)) = (projected, utilization) else {
            tracing::warn!(
                max_potential_loss = %order.max_potential_loss,
                risk_used = %day.risk_used,
                "Rejecting order whose projected risk overflows"
            );
            return ValidationResult::denied(day.daily_limit, day.risk_used, REASON_INVALID_LOSS);
        };
        let is_allowed = projected <= day.daily_limit;
        let warning_level =
            is_allowed && utilization_after_order >= self.config.warning_utilization;

        let reason = if !is_allowed {
            REASON_EXCEEDS_LIMIT
        } else if warning_level {
            REASON_APPROACHING_LIMIT
        } else {
            ""
        };

        tracing::debug!(
            date = %day.date,
            max_potential_loss = %order.max_potential_loss,
            risk_used = %day.risk_used,
            daily_limit = %day.daily_limit,
            utilization = %utilization_after_order,
            is_allowed,
            warning_level,
            "Order validated"
        );

        ValidationResult {
            is_allowed,
            daily_limit: day.daily_limit,
            current_usage_before_order: day.risk_used,
            utilization_after_order,
            warning_level,
            reason: reason.to_string(),
        }
    }

    /// Apply an execution to the day it belongs to
    ///
    /// A record dated after the open day advances the day first. Entries add
    /// their max potential loss to the risk used; exits only realize P&L.
    /// The pre-record utilization is written back onto `record`.
    pub fn record_execution(&mut self, record: &mut ExecutionRecord) -> Result<(), RiskError> {
        self.check_order(record.execution_date)?;

        let day = match self.current_day.take() {
            Some(day) if day.date == record.execution_date => self.current_day.insert(day),
            other => {
                self.current_day = other;
                self.open_day(record.execution_date)
            }
        };

        record.utilization = Some(day.utilization());

        if !record.is_exit() {
            if record.max_potential_loss < dec!(0) {
                tracing::warn!(
                    id = %record.id,
                    max_potential_loss = %record.max_potential_loss,
                    "Negative max potential loss treated as zero risk"
                );
            } else {
                day.risk_used = accumulate(day.risk_used, record.max_potential_loss, "risk_used");
            }
        }
        day.day_pnl = accumulate(day.day_pnl, record.pnl, "day_pnl");

        if day.risk_used > day.daily_limit {
            tracing::warn!(
                date = %day.date,
                risk_used = %day.risk_used,
                daily_limit = %day.daily_limit,
                "Risk used exceeds daily limit"
            );
        }

        tracing::debug!(
            id = %record.id,
            strategy = %record.strategy_name,
            exit = ?record.exit_reason,
            pnl = %record.pnl,
            risk_used = %day.risk_used,
            day_pnl = %day.day_pnl,
            "Execution recorded"
        );

        self.publish_metrics();
        Ok(())
    }

    /// Whole units of `max_potential_loss_per_unit` that still fit today
    pub fn calculate_max_position_size(&self, max_potential_loss_per_unit: Decimal) -> u64 {
        if max_potential_loss_per_unit <= dec!(0) {
            return 0;
        }

        let remaining = self.remaining_capacity();
        if remaining <= dec!(0) {
            return 0;
        }

        remaining
            .checked_div(max_potential_loss_per_unit)
            .and_then(|units| units.floor().to_u64())
            .unwrap_or(0)
    }

    /// Operator override: clear the streak and restore today's full limit
    pub fn reset_consecutive_losses(&mut self) {
        let previous = self.consecutive_loss_days;
        self.consecutive_loss_days = 0;

        let limit = self.config.sequence.limit_for(0);
        if let Some(day) = self.current_day.as_mut() {
            day.daily_limit = limit;
            day.consecutive_loss_days_at_start = 0;
        }

        tracing::info!(
            loss_days_before = previous,
            daily_limit = %limit,
            "Consecutive losses reset"
        );
        self.publish_metrics();
    }

    /// Snapshot of the current state
    pub fn status(&self) -> RiskStatus {
        match &self.current_day {
            Some(day) => RiskStatus {
                date: Some(day.date),
                consecutive_loss_days: self.consecutive_loss_days,
                daily_limit: day.daily_limit,
                risk_used: day.risk_used,
                remaining_capacity: (day.daily_limit - day.risk_used).max(dec!(0)),
                current_utilization: day.utilization(),
                day_pnl: day.day_pnl,
                total_days_tracked: self.history.len(),
            },
            None => RiskStatus {
                date: None,
                consecutive_loss_days: self.consecutive_loss_days,
                daily_limit: self.next_daily_limit(),
                risk_used: dec!(0),
                remaining_capacity: dec!(0),
                current_utilization: dec!(0),
                day_pnl: dec!(0),
                total_days_tracked: self.history.len(),
            },
        }
    }

    /// Closed days, oldest first
    pub fn day_history(&self) -> &[DayHistoryRecord] {
        &self.history
    }

    /// The open day's state, if any
    pub fn current_day(&self) -> Option<&DailyRiskState> {
        self.current_day.as_ref()
    }

    pub fn consecutive_loss_days(&self) -> u32 {
        self.consecutive_loss_days
    }

    /// Fraction of today's limit already committed (0 with no day open)
    pub fn current_utilization(&self) -> Decimal {
        self.current_day
            .as_ref()
            .map(DailyRiskState::utilization)
            .unwrap_or(dec!(0))
    }

    /// Budget left today (0 with no day open)
    pub fn remaining_capacity(&self) -> Decimal {
        self.current_day
            .as_ref()
            .map(|day| day.daily_limit - day.risk_used)
            .unwrap_or(dec!(0))
    }

    fn next_daily_limit(&self) -> Decimal {
        self.config.sequence.limit_for(self.consecutive_loss_days)
    }

    fn check_order(&self, date: NaiveDate) -> Result<(), RiskError> {
        let out_of_order = match (&self.current_day, self.history.last()) {
            (Some(day), _) => (date < day.date).then_some(day.date),
            (None, Some(last)) => (date <= last.date).then_some(last.date),
            (None, None) => None,
        };

        match out_of_order {
            Some(current) => {
                tracing::error!(%current, requested = %date, "Trading day out of order");
                Err(RiskError::DayOutOfOrder {
                    current,
                    requested: date,
                })
            }
            None => Ok(()),
        }
    }

    fn open_day(&mut self, date: NaiveDate) -> &mut DailyRiskState {
        self.close_trading_day();

        let daily_limit = self.next_daily_limit();
        tracing::info!(
            %date,
            consecutive_loss_days = self.consecutive_loss_days,
            %daily_limit,
            "Trading day started"
        );

        let state = DailyRiskState {
            date,
            consecutive_loss_days_at_start: self.consecutive_loss_days,
            daily_limit,
            risk_used: dec!(0),
            day_pnl: dec!(0),
        };
        telemetry::record_risk_status(&RiskStatus {
            date: Some(date),
            consecutive_loss_days: self.consecutive_loss_days,
            daily_limit,
            risk_used: dec!(0),
            remaining_capacity: daily_limit,
            current_utilization: dec!(0),
            day_pnl: dec!(0),
            total_days_tracked: self.history.len(),
        });
        self.current_day.insert(state)
    }

    fn publish_metrics(&self) {
        telemetry::record_risk_status(&self.status());
    }
}

/// Add `delta` to a running total, saturating at the `Decimal` bounds
fn accumulate(total: Decimal, delta: Decimal, field: &'static str) -> Decimal {
    total.checked_add(delta).unwrap_or_else(|| {
        tracing::warn!(field, %total, %delta, "Running total saturated");
        total.saturating_add(delta)
    })
}

impl Default for RFibManager {
    fn default() -> Self {
        Self::new(RFibConfig::default())
    }
}

impl super::RiskManager for RFibManager {
    fn validate_order(&self, order: &CandidateOrder) -> ValidationResult {
        RFibManager::validate_order(self, order)
    }

    fn current_utilization(&self) -> Decimal {
        RFibManager::current_utilization(self)
    }
}

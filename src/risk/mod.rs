//! Risk management module
//!
//! Reverse-Fibonacci daily budget, order validation and guardrail audit

mod audit;
mod rfib;
mod sequence;
mod types;

pub use audit::{audit_guardrail, DailyPnl, GuardrailBreach, GuardrailReport};
pub use rfib::{
    next_loss_streak, DailyRiskState, DayHistoryRecord, RFibConfig, RFibManager, RiskStatus,
    REASON_APPROACHING_LIMIT, REASON_EXCEEDS_LIMIT, REASON_INVALID_LOSS, REASON_NO_DAY_OPEN,
};
pub use sequence::RiskLimitSequence;
pub use types::{CandidateOrder, ExecutionRecord, ExitReason, RiskError, ValidationResult};

use rust_decimal::Decimal;

/// Trait for capital budget implementations consulted by the admission gate
pub trait RiskManager: Send + Sync {
    /// Check if an order fits the remaining budget
    fn validate_order(&self, order: &CandidateOrder) -> ValidationResult;
    /// Fraction of the budget already committed
    fn current_utilization(&self) -> Decimal;
}

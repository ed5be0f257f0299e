//! After-the-fact guardrail audit
//!
//! Replays a realized P&L series through the same streak rules the live
//! manager uses and flags every day that lost more than the ceiling in force
//! when it opened.

use super::rfib::{next_loss_streak, RFibConfig};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Realized P&L for a date (several rows per date are summed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
}

/// A day whose loss exceeded its allowed ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailBreach {
    pub date: NaiveDate,
    pub net_pnl: Decimal,
    pub loss_streak_at_open: u32,
    pub allowed_loss: Decimal,
}

/// Audit summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailReport {
    pub total_days: usize,
    pub losing_days: usize,
    pub net_pnl: Decimal,
    pub max_loss_streak: u32,
    pub breaches: Vec<GuardrailBreach>,
}

impl GuardrailReport {
    pub fn is_clean(&self) -> bool {
        self.breaches.is_empty()
    }
}

/// Audit `rows` against the ceilings in `config`
pub fn audit_guardrail(rows: &[DailyPnl], config: &RFibConfig) -> GuardrailReport {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for row in rows {
        let total = by_day.entry(row.date).or_insert(dec!(0));
        *total = total.saturating_add(row.pnl);
    }

    let mut streak = 0u32;
    let mut max_loss_streak = 0u32;
    let mut losing_days = 0usize;
    let mut breaches = vec![];

    for (&date, &pnl) in &by_day {
        let allowed_loss = config.sequence.limit_for(streak);
        if pnl < dec!(0) {
            losing_days += 1;
            if -pnl > allowed_loss {
                tracing::warn!(%date, %pnl, %allowed_loss, streak, "Guardrail breach");
                breaches.push(GuardrailBreach {
                    date,
                    net_pnl: pnl,
                    loss_streak_at_open: streak,
                    allowed_loss,
                });
            }
        }

        streak = next_loss_streak(streak, pnl, config.reset_profit_threshold);
        max_loss_streak = max_loss_streak.max(streak);
    }

    GuardrailReport {
        total_days: by_day.len(),
        losing_days,
        net_pnl: by_day.values().fold(dec!(0), |acc, pnl| acc.saturating_add(*pnl)),
        max_loss_streak,
        breaches,
    }
}

//! Multi-day RFib lifecycle tests

use chrono::NaiveDate;
use odte_governor::risk::{
    audit_guardrail, CandidateOrder, DailyPnl, ExecutionRecord, ExitReason, RFibConfig,
    RFibManager, RiskLimitSequence,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
}

/// Open an entry and close it the same day for `pnl`
fn trade(manager: &mut RFibManager, day: u32, risk: Decimal, pnl: Decimal) {
    let mut entry = ExecutionRecord::entry(date(day), risk, "credit_spread");
    manager.record_execution(&mut entry).unwrap();
    let mut exit = ExecutionRecord::exit(date(day), pnl, ExitReason::DayEnd, "credit_spread");
    manager.record_execution(&mut exit).unwrap();
}

#[test]
fn test_losing_week_then_recovery() {
    let config = RFibConfig {
        sequence: RiskLimitSequence::new(vec![
            dec!(500),
            dec!(300),
            dec!(200),
            dec!(100),
            dec!(100),
        ])
        .unwrap(),
        ..RFibConfig::default()
    };
    let mut manager = RFibManager::from_config(&config).unwrap();
    let expected_limits = [dec!(500), dec!(300), dec!(200), dec!(100), dec!(100), dec!(100)];

    for (offset, limit) in expected_limits.iter().enumerate() {
        let day = 1 + offset as u32;
        manager.start_new_trading_day(date(day)).unwrap();
        assert_eq!(manager.status().daily_limit, *limit, "day {}", day);
        trade(&mut manager, day, *limit, dec!(-25));
    }

    // small win holds the streak
    manager.start_new_trading_day(date(8)).unwrap();
    trade(&mut manager, 8, dec!(50), dec!(75));
    manager.start_new_trading_day(date(9)).unwrap();
    assert_eq!(manager.consecutive_loss_days(), 6);
    assert_eq!(manager.status().daily_limit, dec!(100));

    // big win resets it
    trade(&mut manager, 9, dec!(100), dec!(200));
    manager.start_new_trading_day(date(10)).unwrap();
    assert_eq!(manager.consecutive_loss_days(), 0);
    assert_eq!(manager.status().daily_limit, dec!(500));

    let history = manager.day_history();
    assert_eq!(history.len(), 8);
    assert!(history.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn test_budget_fills_then_denies() {
    let mut manager = RFibManager::default();
    manager.start_new_trading_day(date(1)).unwrap();

    let mut admitted = 0;
    for _ in 0..10 {
        let order = CandidateOrder::new(dec!(30), dec!(120), "ic");
        let verdict = manager.validate_order(&order);
        if !verdict.is_allowed {
            assert_eq!(verdict.reason, "exceeds daily limit");
            break;
        }
        let mut entry = ExecutionRecord::entry(date(1), order.max_potential_loss, "ic");
        manager.record_execution(&mut entry).unwrap();
        admitted += 1;
    }

    // 4 x 120 = 480 fits, a fifth would be 600
    assert_eq!(admitted, 4);
    assert_eq!(manager.status().risk_used, dec!(480));
    assert_eq!(manager.calculate_max_position_size(dec!(20)), 1);
}

#[test]
fn test_audit_agrees_with_manager() {
    let pnls = [dec!(-120), dec!(-310), dec!(40), dec!(-90), dec!(180), dec!(-50)];
    let mut manager = RFibManager::default();
    let mut rows = vec![];

    for (offset, pnl) in pnls.iter().enumerate() {
        let day = 1 + offset as u32;
        manager.start_new_trading_day(date(day)).unwrap();
        let mut exit = ExecutionRecord::exit(date(day), *pnl, ExitReason::StopLoss, "bwb");
        manager.record_execution(&mut exit).unwrap();
        rows.push(DailyPnl {
            date: date(day),
            pnl: *pnl,
        });
    }
    manager.close_trading_day();

    let report = audit_guardrail(&rows, manager.config());
    let history = manager.day_history();

    // -310 on day 2 exceeded the 300 allowed after one loss
    assert_eq!(report.breaches.len(), 1);
    assert_eq!(report.breaches[0].date, date(2));
    for breach in &report.breaches {
        let record = history.iter().find(|r| r.date == breach.date).unwrap();
        assert_eq!(record.consecutive_loss_days_at_start, breach.loss_streak_at_open);
        assert_eq!(record.daily_limit, breach.allowed_loss);
    }
    assert_eq!(report.net_pnl, history.iter().map(|r| r.pnl).sum::<Decimal>());
}

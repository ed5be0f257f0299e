//! End-to-end admission tests

use chrono::NaiveDate;
use odte_governor::gate::{Admission, AdmissionGate, RejectCause};
use odte_governor::risk::{CandidateOrder, ExecutionRecord, RFibManager};
use odte_governor::score::{Decision, GoInputs, GoScorer, Regime, StrategyKind};
use rust_decimal_macros::dec;

fn strong() -> GoInputs {
    GoInputs {
        poe: dec!(0.85),
        pot: dec!(0.05),
        edge: dec!(0.15),
        liq_score: dec!(0.8),
        reg_score: dec!(0.9),
        pin_score: dec!(0.8),
        rfib_util: dec!(0.3),
    }
}

#[test]
fn test_scores_decide_before_capital() {
    let gate = AdmissionGate::new(GoScorer::default());
    let mut manager = RFibManager::default();
    let today = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
    manager.start_new_trading_day(today).unwrap();

    let order = CandidateOrder::new(dec!(50), dec!(200), "iron condor");
    let first = gate.evaluate(&strong(), StrategyKind::IronCondor, Regime::Calm, &order, &manager);
    assert!(first.is_admitted());
    assert_eq!(first.breakdown().decision, Decision::Full);

    let mut entry = ExecutionRecord::entry(today, dec!(200), "iron_condor");
    manager.record_execution(&mut entry).unwrap();
    let mut entry = ExecutionRecord::entry(today, dec!(200), "iron_condor");
    manager.record_execution(&mut entry).unwrap();

    // same quality, no capital left
    let second = gate.evaluate(&strong(), StrategyKind::IronCondor, Regime::Calm, &order, &manager);
    match second {
        Admission::Rejected {
            cause: RejectCause::RiskLimit(_),
            breakdown,
            ..
        } => assert_eq!(breakdown.decision, Decision::Full),
        other => panic!("expected capital rejection, got {:?}", other),
    }
}

#[test]
fn test_live_utilization_can_downgrade_decision() {
    let gate = AdmissionGate::new(GoScorer::default()).with_live_utilization(true);
    let mut manager = RFibManager::default();
    let today = NaiveDate::from_ymd_opt(2024, 8, 6).unwrap();
    manager.start_new_trading_day(today).unwrap();

    // 73 with an empty budget, 65 once 80% is committed
    let inputs = GoInputs {
        poe: dec!(0.70),
        pot: dec!(0.10),
        edge: dec!(0.10),
        liq_score: dec!(0.70),
        reg_score: dec!(0.70),
        pin_score: dec!(0.70),
        rfib_util: dec!(0),
    };
    let order = CandidateOrder::new(dec!(10), dec!(40), "spread");

    let fresh = gate.evaluate(&inputs, StrategyKind::CreditSpread, Regime::Mixed, &order, &manager);
    assert_eq!(fresh.breakdown().decision, Decision::Full);

    let mut entry = ExecutionRecord::entry(today, dec!(400), "earlier");
    manager.record_execution(&mut entry).unwrap();

    let loaded = gate.evaluate(
        &inputs,
        StrategyKind::CreditSpread,
        Regime::Mixed,
        &order,
        &manager,
    );
    assert_eq!(loaded.breakdown().decision, Decision::Half);
    assert_eq!(loaded.order().unwrap().max_potential_loss, dec!(20));
}

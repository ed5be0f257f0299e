//! GoScore calculation

use super::{
    Decision, Factor, FactorContribution, GoInputs, GoPolicy, GoScoreBreakdown, PolicyError,
    Regime, StrategyKind, Thresholds,
};
use crate::telemetry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Stateless admission scorer
///
/// Holds only a validated policy, so one instance can be shared freely
/// across threads and trading days.
#[derive(Debug, Clone)]
pub struct GoScorer {
    policy: GoPolicy,
}

impl GoScorer {
    /// Create a scorer, rejecting a misconfigured policy
    pub fn new(policy: GoPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &GoPolicy {
        &self.policy
    }

    /// Score a candidate and map it to a decision
    pub fn score(
        &self,
        inputs: &GoInputs,
        strategy: StrategyKind,
        regime: Regime,
    ) -> GoScoreBreakdown {
        let weights = self.policy.weights_for(strategy, regime);
        let thresholds = *self.policy.thresholds_for(strategy, regime);

        let contributions: Vec<FactorContribution> = Factor::ALL
            .iter()
            .map(|&factor| {
                let raw = inputs.get(factor);
                let normalized = factor.normalize(raw);
                let weight = weights.get(factor);
                FactorContribution {
                    factor,
                    raw,
                    normalized,
                    weight,
                    contribution: weight * normalized * dec!(100),
                }
            })
            .collect();

        let final_score: Decimal = contributions.iter().map(|c| c.contribution).sum();
        let decision = decide(final_score, &thresholds);

        tracing::debug!(
            %strategy,
            %regime,
            score = %final_score,
            %decision,
            "GoScore computed"
        );
        telemetry::record_decision(decision);

        GoScoreBreakdown {
            strategy,
            regime,
            contributions,
            final_score,
            thresholds,
            decision,
        }
    }
}

impl Default for GoScorer {
    fn default() -> Self {
        Self {
            policy: GoPolicy::default(),
        }
    }
}

/// Map a score onto the Full / Half / Skip bands
pub fn decide(score: Decimal, thresholds: &Thresholds) -> Decision {
    if score >= thresholds.full {
        Decision::Full
    } else if score >= thresholds.half {
        Decision::Half
    } else {
        Decision::Skip
    }
}

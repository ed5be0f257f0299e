//! Admission gate
//!
//! A trade proceeds only when GoScore likes its quality and the risk budget
//! has room for it. Half-scored trades are validated at half size.

use crate::risk::{CandidateOrder, RiskManager, ValidationResult};
use crate::score::{Decision, GoInputs, GoScoreBreakdown, GoScorer, Regime, StrategyKind};
use crate::telemetry;
use serde::Serialize;

/// Why a candidate was turned away
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectCause {
    /// GoScore below the half-size threshold
    LowScore,
    /// Budget check denied the (possibly halved) order
    RiskLimit(String),
}

impl RejectCause {
    pub fn label(&self) -> &'static str {
        match self {
            RejectCause::LowScore => "low_score",
            RejectCause::RiskLimit(_) => "risk_limit",
        }
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Admission {
    /// Cleared; `order` is already sized to the decision
    Admitted {
        order: CandidateOrder,
        breakdown: GoScoreBreakdown,
        validation: ValidationResult,
    },
    /// Turned away; `validation` is absent when scoring alone rejected it
    Rejected {
        cause: RejectCause,
        breakdown: GoScoreBreakdown,
        validation: Option<ValidationResult>,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    /// The order to execute, if admitted
    pub fn order(&self) -> Option<&CandidateOrder> {
        match self {
            Admission::Admitted { order, .. } => Some(order),
            Admission::Rejected { .. } => None,
        }
    }

    pub fn breakdown(&self) -> &GoScoreBreakdown {
        match self {
            Admission::Admitted { breakdown, .. } | Admission::Rejected { breakdown, .. } => {
                breakdown
            }
        }
    }

    /// Advisory warning from the budget check
    pub fn has_warning(&self) -> bool {
        matches!(self, Admission::Admitted { validation, .. } if validation.warning_level)
    }
}

/// GoScore followed by the risk budget check
#[derive(Debug, Clone, Default)]
pub struct AdmissionGate {
    scorer: GoScorer,
    live_utilization: bool,
}

impl AdmissionGate {
    pub fn new(scorer: GoScorer) -> Self {
        Self {
            scorer,
            live_utilization: false,
        }
    }

    /// Score with the budget's current utilization instead of the supplied one
    pub fn with_live_utilization(mut self, enabled: bool) -> Self {
        self.live_utilization = enabled;
        self
    }

    pub fn scorer(&self) -> &GoScorer {
        &self.scorer
    }

    /// Run a candidate through scoring and the budget check
    pub fn evaluate<R: RiskManager + ?Sized>(
        &self,
        inputs: &GoInputs,
        strategy: StrategyKind,
        regime: Regime,
        order: &CandidateOrder,
        risk: &R,
    ) -> Admission {
        let inputs = if self.live_utilization {
            inputs.with_rfib_util(risk.current_utilization())
        } else {
            *inputs
        };

        let breakdown = self.scorer.score(&inputs, strategy, regime);

        let sized = match breakdown.decision {
            Decision::Skip => {
                tracing::info!(
                    %strategy,
                    %regime,
                    score = %breakdown.final_score,
                    "Candidate skipped on score"
                );
                return reject(RejectCause::LowScore, breakdown, None);
            }
            Decision::Half => order.halved(),
            Decision::Full => order.clone(),
        };

        let validation = risk.validate_order(&sized);
        if !validation.is_allowed {
            tracing::info!(
                %strategy,
                decision = %breakdown.decision,
                max_potential_loss = %sized.max_potential_loss,
                reason = %validation.reason,
                "Candidate denied by risk budget"
            );
            let cause = RejectCause::RiskLimit(validation.reason.clone());
            return reject(cause, breakdown, Some(validation));
        }

        if validation.warning_level {
            tracing::warn!(
                %strategy,
                utilization = %validation.utilization_after_order,
                "Admitted near daily limit"
            );
        }

        tracing::info!(
            %strategy,
            %regime,
            decision = %breakdown.decision,
            score = %breakdown.final_score,
            max_potential_loss = %sized.max_potential_loss,
            "Candidate admitted"
        );

        Admission::Admitted {
            order: sized,
            breakdown,
            validation,
        }
    }
}

fn reject(
    cause: RejectCause,
    breakdown: GoScoreBreakdown,
    validation: Option<ValidationResult>,
) -> Admission {
    telemetry::record_rejection(cause.label());
    Admission::Rejected {
        cause,
        breakdown,
        validation,
    }
}

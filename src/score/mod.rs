//! GoScore admission scoring
//!
//! Combines seven normalized factors with regime and strategy specific
//! weights into a 0-100 score and a Full / Half / Skip decision

mod policy;
mod scorer;
mod types;

pub use policy::{FactorWeights, GoPolicy, PolicyError, PolicyOverride, Thresholds};
pub use scorer::{decide, GoScorer};
pub use types::{
    Decision, Factor, FactorContribution, GoInputs, GoScoreBreakdown, Regime, StrategyKind,
};

//! Score command implementation

use crate::config::Config;
use crate::score::{GoInputs, GoScorer, Regime, StrategyKind};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Probability of expiring profitable (0-1)
    #[arg(long)]
    pub poe: Decimal,

    /// Probability of touching the stop level (0-1)
    #[arg(long)]
    pub pot: Decimal,

    /// Expected value estimate (-1..1)
    #[arg(long, allow_negative_numbers = true)]
    pub edge: Decimal,

    /// Liquidity score (0-1)
    #[arg(long)]
    pub liq: Decimal,

    /// Regime fit score (0-1)
    #[arg(long)]
    pub reg: Decimal,

    /// Pin risk score, higher is safer (0-1)
    #[arg(long)]
    pub pin: Decimal,

    /// Share of today's risk budget already used
    #[arg(long, default_value = "0")]
    pub rfib_util: Decimal,

    /// Strategy kind: credit_spread, iron_condor, bwb, tail_overlay
    #[arg(long, default_value = "credit_spread")]
    pub strategy: StrategyKind,

    /// Market regime: calm, mixed, convex
    #[arg(long, default_value = "mixed")]
    pub regime: Regime,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ScoreArgs {
    pub fn inputs(&self) -> GoInputs {
        GoInputs {
            poe: self.poe,
            pot: self.pot,
            edge: self.edge,
            liq_score: self.liq,
            reg_score: self.reg,
            pin_score: self.pin,
            rfib_util: self.rfib_util,
        }
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let scorer = GoScorer::new(config.goscore.clone())?;
        let breakdown = scorer.score(&self.inputs(), self.strategy, self.regime);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        } else {
            println!("{}", breakdown.format_table());
        }
        Ok(())
    }
}

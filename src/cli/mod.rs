//! CLI interface for odte-governor
//!
//! Provides subcommands for:
//! - `score`: Score one candidate and print the breakdown
//! - `replay`: Drive the risk manager and gate over a JSON event stream
//! - `audit`: Check a daily P&L series against the RFib ceilings
//! - `config`: Show the resolved configuration

mod audit;
mod replay;
mod score;

pub use audit::AuditArgs;
pub use replay::{Replay, ReplayArgs, ReplayEvent, ReplaySummary};
pub use score::ScoreArgs;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "odte-governor")]
#[command(about = "Daily capital risk governor and trade admission scorer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// JSON GoScore policy, replacing the [goscore] table
    #[arg(short, long)]
    pub policy: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one candidate
    Score(ScoreArgs),
    /// Replay a JSON event stream through the gate and risk manager
    Replay(ReplayArgs),
    /// Audit a daily P&L series against the loss ceilings
    Audit(AuditArgs),
    /// Show configuration
    Config,
}

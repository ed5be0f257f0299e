//! Audit command implementation

use crate::config::Config;
use crate::risk::{audit_guardrail, DailyPnl};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// JSON file with an array of {"date", "pnl"} rows
    pub days: PathBuf,

    /// Exit with an error if any day breached its ceiling
    #[arg(long)]
    pub fail_on_breach: bool,
}

impl AuditArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&self.days).await?;
        let rows: Vec<DailyPnl> = serde_json::from_str(&content)?;

        let report = audit_guardrail(&rows, &config.rfib);
        tracing::info!(
            days = report.total_days,
            breaches = report.breaches.len(),
            max_loss_streak = report.max_loss_streak,
            "Guardrail audit complete"
        );
        println!("{}", serde_json::to_string_pretty(&report)?);

        if self.fail_on_breach && !report.is_clean() {
            anyhow::bail!("{} guardrail breach(es) found", report.breaches.len());
        }
        Ok(())
    }
}

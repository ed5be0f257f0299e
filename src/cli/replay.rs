//! Replay command implementation
//!
//! Feeds a chronological JSON event stream through one risk manager and the
//! admission gate, the way a backtest or live loop would drive them.

use crate::config::Config;
use crate::gate::{Admission, AdmissionGate};
use crate::risk::{CandidateOrder, DayHistoryRecord, ExecutionRecord, RFibManager, RiskStatus};
use crate::score::{GoInputs, GoScorer, Regime, StrategyKind};
use crate::telemetry::TelemetryGuard;
use chrono::NaiveDate;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON file with an array of events
    pub events: PathBuf,

    /// Score with the manager's live utilization instead of the supplied one
    #[arg(long)]
    pub live_utilization: bool,

    /// Print Prometheus metrics after the summary
    #[arg(long)]
    pub metrics: bool,
}

/// One step of a replay
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// Advance to a new trading day
    StartDay { date: NaiveDate },
    /// Evaluate a candidate; when `execute` is set an admitted order is
    /// recorded as an entry on the open day
    Candidate {
        strategy: StrategyKind,
        regime: Regime,
        inputs: GoInputs,
        order: CandidateOrder,
        #[serde(default)]
        execute: bool,
    },
    /// Apply an execution reported by the strategy engine
    Execution(ExecutionRecord),
    /// Operator reset of the losing streak
    ResetLosses,
    /// Close the open day without opening another
    EndDay,
}

/// Totals printed at the end of a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub admitted: usize,
    pub rejected: usize,
    pub warnings: usize,
    pub status: RiskStatus,
    pub history: Vec<DayHistoryRecord>,
}

/// Replay state: one manager, one gate
pub struct Replay {
    manager: RFibManager,
    gate: AdmissionGate,
    admitted: usize,
    rejected: usize,
    warnings: usize,
}

impl Replay {
    pub fn new(manager: RFibManager, gate: AdmissionGate) -> Self {
        Self {
            manager,
            gate,
            admitted: 0,
            rejected: 0,
            warnings: 0,
        }
    }

    pub fn from_config(config: &Config, live_utilization: bool) -> anyhow::Result<Self> {
        let manager = RFibManager::from_config(&config.rfib)?;
        let scorer = GoScorer::new(config.goscore.clone())?;
        let gate = AdmissionGate::new(scorer).with_live_utilization(live_utilization);
        Ok(Self::new(manager, gate))
    }

    pub fn manager(&self) -> &RFibManager {
        &self.manager
    }

    /// Apply one event; sequencing errors abort the replay
    ///
    /// Returns the gate's verdict for candidate events.
    pub fn apply(&mut self, event: ReplayEvent) -> anyhow::Result<Option<Admission>> {
        match event {
            ReplayEvent::StartDay { date } => {
                self.manager.start_new_trading_day(date)?;
                Ok(None)
            }
            ReplayEvent::Candidate {
                strategy,
                regime,
                inputs,
                order,
                execute,
            } => {
                let admission =
                    self.gate.evaluate(&inputs, strategy, regime, &order, &self.manager);

                if admission.has_warning() {
                    self.warnings += 1;
                }

                match admission.order() {
                    Some(admitted) => {
                        self.admitted += 1;
                        if execute {
                            self.execute_admitted(admitted, strategy)?;
                        }
                    }
                    None => self.rejected += 1,
                }

                Ok(Some(admission))
            }
            ReplayEvent::Execution(mut record) => {
                self.manager.record_execution(&mut record)?;
                Ok(None)
            }
            ReplayEvent::ResetLosses => {
                self.manager.reset_consecutive_losses();
                Ok(None)
            }
            ReplayEvent::EndDay => {
                self.manager.close_trading_day();
                Ok(None)
            }
        }
    }

    /// Close the last day and report
    pub fn finish(mut self) -> ReplaySummary {
        self.manager.close_trading_day();
        ReplaySummary {
            admitted: self.admitted,
            rejected: self.rejected,
            warnings: self.warnings,
            status: self.manager.status(),
            history: self.manager.day_history().to_vec(),
        }
    }

    fn execute_admitted(
        &mut self,
        order: &CandidateOrder,
        strategy: StrategyKind,
    ) -> anyhow::Result<()> {
        let date = self
            .manager
            .current_day()
            .map(|day| day.date)
            .ok_or_else(|| anyhow::anyhow!("admitted order with no trading day open"))?;

        let mut entry =
            ExecutionRecord::entry(date, order.max_potential_loss, strategy.to_string());
        self.manager.record_execution(&mut entry)?;
        Ok(())
    }
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config, telemetry: &TelemetryGuard) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&self.events).await?;
        let events: Vec<ReplayEvent> = serde_json::from_str(&content)?;
        tracing::info!(events = events.len(), path = ?self.events, "Replaying events");

        let mut replay = Replay::from_config(config, self.live_utilization)?;
        for (idx, event) in events.into_iter().enumerate() {
            replay
                .apply(event)
                .map_err(|e| anyhow::anyhow!("event #{}: {}", idx, e))?;
        }

        let summary = replay.finish();
        println!("{}", serde_json::to_string_pretty(&summary)?);

        if self.metrics {
            match telemetry.render_metrics() {
                Some(rendered) => println!("{}", rendered),
                None => tracing::warn!("Metrics requested but no recorder installed"),
            }
        }
        Ok(())
    }
}

//! Periodic ingestion scheduler
//!
//! Runs [`Pipeline::run_cycle`] on a fixed interval until the cancellation
//! token fires. Cancellation is only observed between cycles: a cycle that
//! has started always runs to completion.
//!
//! ```text
//! Idle --tick--> Running --done--> Idle
//!   \--cancelled--> Stopped
//! ```

use std::time::Duration;

use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::sink::LedgerSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Running,
    /// Terminal; `run` returns once this is reached
    Stopped,
}

/// Totals for the lifetime of one `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    pub cycles: usize,
    pub failed_cycles: usize,
}

pub struct Scheduler<S: LedgerSink> {
    pipeline: Pipeline<S>,
    every: Duration,
    run_on_start: bool,
    state: SchedulerState,
}

impl<S: LedgerSink> Scheduler<S> {
    /// Fails if `every` is zero
    pub fn new(pipeline: Pipeline<S>, every: Duration) -> Result<Self> {
        if every.is_zero() {
            return Err(Error::Config(
                "scheduler interval must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            pipeline,
            every,
            run_on_start: false,
            state: SchedulerState::Idle,
        })
    }

    /// Run a cycle immediately instead of waiting one full interval
    pub fn run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Tick until `cancel` fires, then return what was done
    pub async fn run(&mut self, cancel: CancellationToken) -> SchedulerSummary {
        let mut summary = SchedulerSummary::default();
        if self.state == SchedulerState::Stopped {
            return summary;
        }

        info!(
            input = %self.pipeline.input_dir().display(),
            every_secs = self.every.as_secs(),
            run_on_start = self.run_on_start,
            "Starting ingestion scheduler"
        );

        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        if !self.run_on_start {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.state = SchedulerState::Stopped;
                    info!("Scheduler stopped before first cycle");
                    return summary;
                }
                _ = ticker.tick() => {}
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.state = SchedulerState::Running;
            info!("Running scheduled ingestion...");

            summary.cycles += 1;
            match self.pipeline.run_cycle() {
                Ok(report) => {
                    info!(
                        files = report.files_new,
                        inserted = report.rows_inserted,
                        "Scheduled ingestion completed"
                    );
                }
                Err(e) => {
                    summary.failed_cycles += 1;
                    error!("Scheduled ingestion failed: {}", e);
                }
            }

            self.state = SchedulerState::Idle;
        }

        self.state = SchedulerState::Stopped;
        info!(
            cycles = summary.cycles,
            failed = summary.failed_cycles,
            "Scheduler stopped"
        );
        summary
    }
}

//! Ingestion commands (run, ingest)

use anyhow::{Context, Result};
use tally_core::{Config, CycleReport, Scheduler};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::build_pipeline;

/// Run the scheduler until SIGINT or SIGTERM
pub async fn cmd_run(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let mut scheduler =
        Scheduler::new(pipeline, config.interval())?.run_on_start(config.run_on_start);

    println!(
        "⏱️  Ingesting {} every {} minute(s). Press Ctrl+C to stop.",
        config.input_dir.display(),
        config.run_every_minutes
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let summary = scheduler.run(cancel).await;

    println!();
    println!("🛑 Scheduler stopped");
    println!("   Cycles run:    {}", summary.cycles);
    println!("   Cycles failed: {}", summary.failed_cycles);

    Ok(())
}

/// Run one cycle immediately and print its report
pub fn cmd_ingest(config: &Config) -> Result<()> {
    println!("📥 Ingesting statements from {}...", config.input_dir.display());

    let pipeline = build_pipeline(config)?;
    let report = pipeline.run_cycle().context("Ingestion cycle failed")?;

    print_report(&report);
    Ok(())
}

pub fn print_report(report: &CycleReport) {
    println!();
    println!("📊 Ingestion Results");
    println!("   ─────────────────────────────");
    println!("   New files:            {}", report.files_new);
    println!("   Unreadable files:     {}", report.files_failed);
    println!("   Transactions stored:  {}", report.rows_inserted);
    println!("   Rows skipped:         {}", report.rows_skipped);
    if report.inserts_failed > 0 {
        println!("   ⚠️  Failed to store:   {}", report.inserts_failed);
    }

    if report.files_new == 0 {
        println!();
        println!("✅ Nothing new to ingest.");
    }
}

/// Cancel `token` on the first SIGINT (Ctrl+C) or SIGTERM
async fn cancel_on_shutdown(token: CancellationToken) {
    wait_for_shutdown().await;
    info!("Shutdown requested, finishing current cycle");
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            tokio::signal::ctrl_c().await.ok();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    tokio::signal::ctrl_c().await.ok();
}

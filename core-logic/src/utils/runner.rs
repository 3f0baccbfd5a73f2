use crate::config::RunConfig;
use crate::cycle::{AccountSelection, CycleRunner};
use crate::traits::{CycleTemplate, OperationClient, RunSummary};
use anyhow::Result;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Cancels `token` on the first Ctrl+C.
    pub fn cancel_on_ctrl_c(token: CancellationToken) {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!(target: "cycle", "🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });
    }

    /// Runs a single cycle runner until it finishes or Ctrl+C is pressed.
    pub async fn run_single<C, T>(runner: CycleRunner<C, T>, config: &RunConfig) -> Result<RunSummary>
    where
        C: OperationClient,
        T: CycleTemplate<C>,
    {
        let token = CancellationToken::new();
        Self::cancel_on_ctrl_c(token.clone());

        let start_time = std::time::Instant::now();
        let summary = runner.run(config, token).await?;
        Self::log_totals(&summary, start_time.elapsed());
        Ok(summary)
    }

    /// Spawns runners as concurrent tasks and waits for all of them.
    ///
    /// Runners share nothing mutable; one runner failing, panicking or
    /// sleeping never holds up another.
    pub async fn run_concurrent<C, T>(
        runners: Vec<CycleRunner<C, T>>,
        config: RunConfig,
    ) -> Result<RunSummary>
    where
        C: OperationClient + 'static,
        T: CycleTemplate<C> + 'static,
    {
        // Refuse bad input before anything is spawned.
        config.validate()?;

        let mut set = JoinSet::new();
        let token = CancellationToken::new();
        Self::cancel_on_ctrl_c(token.clone());

        let start_time = std::time::Instant::now();
        info!(target: "cycle", "Starting {} wallet workers...", runners.len());

        for (i, runner) in runners.into_iter().enumerate() {
            let id = match runner.selection() {
                AccountSelection::Fixed(index) => index + 1,
                _ => i + 1,
            };
            let span = tracing::info_span!("worker", worker_id = format!("{:03}", id));
            let child_token = token.clone();
            let config = config.clone();

            set.spawn(
                async move {
                    match runner.run(&config, child_token).await {
                        Ok(summary) => Ok(summary),
                        Err(e) => {
                            error!("Worker {} failed: {}", id, e);
                            Err(e)
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut total = RunSummary::default();
        // A worker that died reports nothing; all of its cycles count as failed.
        let lost = RunSummary {
            attempted: u64::from(config.cycles),
            failed: u64::from(config.cycles),
            ..Default::default()
        };

        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(summary)) => total.merge(&summary),
                Ok(Err(_)) => {
                    // Already logged in task
                    total.merge(&lost);
                }
                Err(e) => {
                    error!("A worker task panicked or failed to join: {:?}", e);
                    total.merge(&lost);
                }
            }
        }

        Self::log_totals(&total, start_time.elapsed());
        Ok(total)
    }

    fn log_totals(summary: &RunSummary, elapsed: std::time::Duration) {
        info!(
            target: "cycle",
            "Total Time: {:.1}s | Cycles: {} | Success: {} | Failed: {} | Tx confirmed: {}/{} | Success Rate: {:.2}%",
            elapsed.as_secs_f64(),
            summary.attempted,
            summary.succeeded,
            summary.failed,
            summary.confirmed,
            summary.submitted,
            summary.success_rate()
        );
    }
}

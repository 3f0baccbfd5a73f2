//! # Cycle Runner
//!
//! Repeats a fixed operation template `N` times. Each cycle walks the stages
//! `select-account → build-operation → submit → confirm → delay`; a failure at
//! any stage is logged and abandons only the current cycle.
//!
//! Every random draw of a cycle (account, amount, in-cycle settle delays) is
//! made before its first submission, so the outcome of one cycle never shifts
//! the draws of the next.

use crate::config::{Amount, Pacing, RunConfig};
use crate::error::{CoreError, OperationError};
use crate::traits::{CycleTemplate, OperationClient, RunSummary, Step};
use crate::utils::random::{RandomSource, ThreadRandom};
use crate::utils::wallet_manager::{Account, AccountPool};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which loaded account issues the operations of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSelection {
    /// Always the account at this position.
    Fixed(usize),
    /// Uniform pick per cycle.
    Random,
    /// `(cycle - 1) % len`.
    RoundRobin,
    /// Every account, in load order, inside the same cycle.
    Each,
}

/// Stage a cycle failed at. Account selection and delays cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    BuildOperation,
    Submit,
    Confirm,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::BuildOperation => "build-operation",
            CycleStage::Submit => "submit",
            CycleStage::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub account: usize,
    pub stage: CycleStage,
    pub step: String,
    pub error: OperationError,
}

/// Outcome of one cycle. Logged, folded into [`RunSummary`], then dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleResult {
    pub cycle: u32,
    pub tx_hashes: Vec<String>,
    pub failures: Vec<StepFailure>,
    pub cancelled: bool,
}

impl CycleResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

enum PlannedStep<O> {
    Submit { label: String, operation: O },
    Pause(Duration),
}

struct Leg<'a, S, O> {
    account: &'a Account<S>,
    amount: Option<Amount>,
    steps: Result<Vec<PlannedStep<O>>, OperationError>,
}

enum LegEnd {
    Done,
    Failed(StepFailure),
    Cancelled,
}

pub struct CycleRunner<C: OperationClient, T> {
    client: Arc<C>,
    accounts: Arc<AccountPool<C::Signer>>,
    template: Arc<T>,
    selection: AccountSelection,
    random: Arc<dyn RandomSource>,
    sleeper: Arc<dyn Sleeper>,
}

impl<C, T> CycleRunner<C, T>
where
    C: OperationClient,
    T: CycleTemplate<C>,
{
    pub fn new(client: Arc<C>, accounts: Arc<AccountPool<C::Signer>>, template: Arc<T>) -> Self {
        Self {
            client,
            accounts,
            template,
            selection: AccountSelection::RoundRobin,
            random: Arc::new(ThreadRandom),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_selection(mut self, selection: AccountSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn selection(&self) -> AccountSelection {
        self.selection
    }

    /// Runs every cycle of `config`. Only configuration problems are returned
    /// as errors, and they are raised before the first submission.
    pub async fn run(
        &self,
        config: &RunConfig,
        token: CancellationToken,
    ) -> Result<RunSummary, CoreError> {
        config.validate()?;
        if let AccountSelection::Fixed(index) = self.selection {
            self.accounts.get(index)?;
        }

        info!(
            target: "cycle",
            "🔄 Running {} cycle(s) of {} over {} wallet(s)...",
            config.cycles,
            self.template.name(),
            self.accounts.len()
        );

        let mut summary = RunSummary::default();

        for cycle in 1..=config.cycles {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            summary.attempted += 1;
            info!(
                target: "cycle",
                "=== Starting Cycle {}/{} ===",
                cycle,
                config.cycles
            );

            let result = self.run_cycle(cycle, config, &token, &mut summary).await;
            self.report(&result, config.cycles);

            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            if result.cancelled {
                summary.cancelled = true;
                break;
            }

            if cycle < config.cycles {
                let delay = match config.pacing() {
                    Pacing::Fixed(interval) => interval,
                    Pacing::Random(range) => self.random.delay(&range),
                };
                info!(
                    target: "cycle",
                    "⏳ Waiting {} before next cycle...",
                    format_duration(delay)
                );
                if !self.pause(delay, &token).await {
                    summary.cancelled = true;
                    break;
                }
                summary.delays += 1;
            }
        }

        info!(
            target: "cycle",
            "{} finished: {}/{} cycles Success, {} Failed{}",
            self.template.name(),
            summary.succeeded,
            summary.attempted,
            summary.failed,
            if summary.cancelled { " (cancelled)" } else { "" }
        );

        Ok(summary)
    }

    async fn run_cycle(
        &self,
        cycle: u32,
        config: &RunConfig,
        token: &CancellationToken,
        summary: &mut RunSummary,
    ) -> CycleResult {
        let legs = self.plan(cycle, config);
        let mut result = CycleResult {
            cycle,
            ..Default::default()
        };

        for leg in legs {
            match self.run_leg(cycle, leg, config, token, summary, &mut result.tx_hashes).await {
                LegEnd::Done => {}
                LegEnd::Failed(failure) => result.failures.push(failure),
                LegEnd::Cancelled => {
                    result.cancelled = true;
                    break;
                }
            }
        }

        result
    }

    /// select-account and build-operation for the whole cycle.
    fn plan(&self, cycle: u32, config: &RunConfig) -> Vec<Leg<'_, C::Signer, C::Operation>> {
        let len = self.accounts.len();
        let indices: Vec<usize> = match self.selection {
            AccountSelection::Fixed(index) => vec![index],
            AccountSelection::Random => vec![self.random.index(len) % len],
            // Cycle 1 uses the first key, not the second.
            AccountSelection::RoundRobin => vec![(cycle as usize - 1) % len],
            AccountSelection::Each => (0..len).collect(),
        };

        let picked: Vec<(&Account<C::Signer>, Option<Amount>)> = indices
            .into_iter()
            .filter_map(|index| self.accounts.get(index).ok())
            .map(|account| {
                let amount = self
                    .template
                    .requires_amount()
                    .then(|| self.random.amount(&config.amount));
                (account, amount)
            })
            .collect();

        picked
            .into_iter()
            .map(|(account, amount)| {
                let steps = self.template.build(account, amount).map(|steps| {
                    steps
                        .into_iter()
                        .map(|step| match step {
                            Step::Submit { label, operation } => {
                                PlannedStep::Submit { label, operation }
                            }
                            Step::Settle => PlannedStep::Pause(self.random.delay(&config.delay)),
                        })
                        .collect()
                });
                Leg {
                    account,
                    amount,
                    steps,
                }
            })
            .collect()
    }

    async fn run_leg(
        &self,
        cycle: u32,
        leg: Leg<'_, C::Signer, C::Operation>,
        config: &RunConfig,
        token: &CancellationToken,
        summary: &mut RunSummary,
        tx_hashes: &mut Vec<String>,
    ) -> LegEnd {
        let account = leg.account;
        let prefix = format!("[WL:{}][Cycle {}]", account.id(), cycle);

        let steps = match leg.steps {
            Ok(steps) => steps,
            Err(error) => {
                return LegEnd::Failed(StepFailure {
                    account: account.index,
                    stage: CycleStage::BuildOperation,
                    step: self.template.name().to_string(),
                    error,
                })
            }
        };

        if let Some(amount) = leg.amount {
            info!(target: "cycle", "{} 🔹 Random amount: {}", prefix, amount);
        }

        for step in steps {
            if token.is_cancelled() {
                return LegEnd::Cancelled;
            }

            let (label, operation) = match step {
                PlannedStep::Pause(delay) => {
                    info!(
                        target: "cycle",
                        "{} ⏳ Waiting {} before next step...",
                        prefix,
                        format_duration(delay)
                    );
                    if !self.pause(delay, token).await {
                        return LegEnd::Cancelled;
                    }
                    continue;
                }
                PlannedStep::Submit { label, operation } => (label, operation),
            };

            let fail = |stage: CycleStage, error: OperationError| {
                LegEnd::Failed(StepFailure {
                    account: account.index,
                    stage,
                    step: label.clone(),
                    error,
                })
            };

            info!(target: "cycle", "{} ⏳ Sending {} from {}...", prefix, label, account.address);
            summary.submitted += 1;
            let pending = match self.client.submit(account, &operation).await {
                Ok(pending) => pending,
                Err(error) => return fail(CycleStage::Submit, error),
            };
            info!(
                target: "cycle",
                "{} ➡️  Transaction sent: {}",
                prefix,
                self.client.explorer_link(&pending)
            );

            let confirmation = tokio::select! {
                res = tokio::time::timeout(config.confirmation_timeout, self.client.confirm(&pending)) => res,
                _ = token.cancelled() => return LegEnd::Cancelled,
            };
            match confirmation {
                Ok(Ok(tx_hash)) => {
                    summary.confirmed += 1;
                    info!(target: "cycle", "{} ✅ {} Success", prefix, label);
                    tx_hashes.push(tx_hash);
                }
                Ok(Err(error)) => return fail(CycleStage::Confirm, error),
                Err(_) => {
                    return fail(
                        CycleStage::Confirm,
                        OperationError::ConfirmationTimeout {
                            tx_hash: self.client.tx_hash(&pending),
                            timeout_secs: config.confirmation_timeout.as_secs(),
                        },
                    )
                }
            }
        }

        LegEnd::Done
    }

    /// Returns `false` when the token fired before the delay elapsed.
    async fn pause(&self, delay: Duration, token: &CancellationToken) -> bool {
        tokio::select! {
            _ = self.sleeper.sleep(delay) => true,
            _ = token.cancelled() => false,
        }
    }

    fn report(&self, result: &CycleResult, total: u32) {
        for failure in &result.failures {
            warn!(
                target: "cycle",
                "[WL:{:03}][Cycle {}] ⚠️ {} FAILED at {}: {}",
                failure.account + 1,
                result.cycle,
                failure.step,
                failure.stage,
                failure.error
            );
        }

        if result.cancelled {
            warn!(target: "cycle", "=== Cycle {}/{} cancelled ===", result.cycle, total);
        } else if result.is_success() {
            info!(
                target: "cycle",
                "=== Cycle {}/{} completed: Success ({} tx) ===",
                result.cycle,
                total,
                result.tx_hashes.len()
            );
        } else {
            warn!(
                target: "cycle",
                "=== Cycle {}/{} FAILED, moving on ===",
                result.cycle,
                total
            );
        }
    }
}

fn format_duration(delay: Duration) -> String {
    let secs = delay.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{} hour(s)", secs / 3600)
    } else if secs >= 60 {
        format!("{:.1} minute(s)", secs as f64 / 60.0)
    } else {
        format!("{} seconds", secs)
    }
}

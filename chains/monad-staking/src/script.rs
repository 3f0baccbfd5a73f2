//! Script catalogue: which template, which accounts, and how many runners.

use crate::client::MonadClient;
use crate::config::MonadConfig;
use crate::task::{AprioriStakeTask, MagmaStakeTask, WmonWrapTask};
use anyhow::Result;
use clap::ValueEnum;
use core_logic::{
    AccountPool, AccountSelection, CycleRunner, CycleTemplate, RunConfig, RunSummary,
    WorkerRunner,
};
use ethers::signers::LocalWallet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Script {
    Rubic,
    Magma,
    Izumi,
    Apriori,
}

impl Script {
    /// Menu order.
    pub const ALL: [Script; 4] = [Script::Rubic, Script::Magma, Script::Izumi, Script::Apriori];

    pub fn title(&self) -> &'static str {
        match self {
            Script::Rubic => "Rubic Script (wrap/unwrap MON)",
            Script::Magma => "Magma Script (stake/unstake MON)",
            Script::Izumi => "Izumi Script (wrap/unwrap MON, all wallets in parallel)",
            Script::Apriori => "Apriori Script (stake MON)",
        }
    }

    pub fn cycle_prompt(&self) -> &'static str {
        match self {
            Script::Rubic => "How many cycles do you want to run? (Press enter for default 1)",
            Script::Magma => "How many times do you want to stake and unstake?",
            Script::Izumi => "How many cycles should each wallet run?",
            Script::Apriori => "How many times do you want to stake?",
        }
    }

    /// Cycle count used when the operator just presses enter.
    pub fn default_cycles(&self) -> Option<u32> {
        match self {
            Script::Rubic => Some(1),
            _ => None,
        }
    }

    pub fn asks_interval(&self) -> bool {
        matches!(self, Script::Rubic)
    }

    /// Account policy of the single runner, or `None` for one concurrent
    /// runner pinned to each account.
    pub fn selection(&self) -> Option<AccountSelection> {
        match self {
            Script::Rubic => Some(AccountSelection::Each),
            Script::Magma => Some(AccountSelection::RoundRobin),
            Script::Apriori => Some(AccountSelection::Random),
            Script::Izumi => None,
        }
    }

    /// Builds the template and runners for this script and drives them to completion.
    pub async fn run(
        &self,
        config: &MonadConfig,
        client: Arc<MonadClient>,
        accounts: Arc<AccountPool<LocalWallet>>,
        run: &RunConfig,
    ) -> Result<RunSummary> {
        let gas = config.gas_config();
        match self {
            Script::Magma => {
                let task = MagmaStakeTask::new(config.contracts.magma, gas);
                self.drive(client, accounts, task, run).await
            }
            Script::Apriori => {
                let task = AprioriStakeTask::new(config.contracts.apriori, gas);
                self.drive(client, accounts, task, run).await
            }
            Script::Rubic | Script::Izumi => {
                let task = WmonWrapTask::new(config.contracts.wmon, gas)?;
                self.drive(client, accounts, task, run).await
            }
        }
    }

    async fn drive<T>(
        &self,
        client: Arc<MonadClient>,
        accounts: Arc<AccountPool<LocalWallet>>,
        task: T,
        run: &RunConfig,
    ) -> Result<RunSummary>
    where
        T: CycleTemplate<MonadClient> + 'static,
    {
        let task = Arc::new(task);
        match self.selection() {
            Some(selection) => {
                let runner = CycleRunner::new(client, accounts, task).with_selection(selection);
                WorkerRunner::run_single(runner, run).await
            }
            None => {
                let runners = per_account_runners(client, accounts, task);
                WorkerRunner::run_concurrent(runners, run.clone()).await
            }
        }
    }
}

/// One runner pinned to each account, all sharing the client and template.
pub fn per_account_runners<T>(
    client: Arc<MonadClient>,
    accounts: Arc<AccountPool<LocalWallet>>,
    task: Arc<T>,
) -> Vec<CycleRunner<MonadClient, T>>
where
    T: CycleTemplate<MonadClient>,
{
    (0..accounts.len())
        .map(|index| {
            CycleRunner::new(client.clone(), accounts.clone(), task.clone())
                .with_selection(AccountSelection::Fixed(index))
        })
        .collect()
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

use monad_staking::client::{parse_wallet, MonadClient};
use monad_staking::config::MonadConfig;
use monad_staking::script::Script;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use core_logic::{
    parse_cycle_count, parse_interval_hours, setup_logger, WalletManager, NARRATION_TARGET,
};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use dotenv::dotenv;
use ethers::signers::Signer;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/monad-staking/config.toml")]
    config: String,
    /// Skip the menu and run this script
    #[arg(short, long, value_enum)]
    script: Option<Script>,
    /// Skip the cycle prompt
    #[arg(long)]
    cycles: Option<String>,
    /// Skip the interval prompt (Rubic only)
    #[arg(long)]
    interval_hours: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    print_banner();

    info!(target: NARRATION_TARGET, "Loading config from: {}", args.config);
    let config = MonadConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;

    let script = match args.script {
        Some(script) => script,
        None => match select_script()? {
            Some(script) => script,
            None => {
                info!(target: NARRATION_TARGET, "Exiting bot...");
                return Ok(());
            }
        },
    };
    info!(target: NARRATION_TARGET, "Running {}", script.title().cyan());

    // Every key must parse before anything is prompted or sent.
    let manager = WalletManager::load(&config.private_key_file)?;
    let chain_id = config.chain_id;
    let accounts = manager.into_pool(|key| {
        parse_wallet(key.expose(), chain_id)
            .map(|wallet| (format!("{:?}", wallet.address()), wallet))
    })?;
    info!(target: NARRATION_TARGET, "Loaded {} wallets", accounts.len());

    let cycles_input = match args.cycles {
        Some(input) => input,
        None => prompt(script.cycle_prompt())?,
    };
    let cycles = parse_cycle_count(&cycles_input, script.default_cycles())?;

    let interval_hours = if script.asks_interval() {
        let input = match args.interval_hours {
            Some(input) => input,
            None => prompt("How often do you want the cycle to run (in hours)? (Press enter for random delay)")?,
        };
        parse_interval_hours(&input)?
    } else {
        None
    };

    let run = config.to_run_config(cycles, interval_hours);
    run.validate()?;

    let client = Arc::new(MonadClient::new(&config)?);
    let summary = script.run(&config, client, Arc::new(accounts), &run).await?;

    let verdict = if summary.failed == 0 {
        "All cycles completed successfully".green()
    } else {
        format!("{} of {} cycles failed", summary.failed, summary.attempted).yellow()
    };
    info!(target: NARRATION_TARGET, "{}", verdict);

    Ok(())
}

fn print_banner() {
    println!("{}", "=======================================".magenta());
    println!("{}", "   Monad Testnet Staking & Wrap Bot    ".bold());
    println!("{}", "=======================================".magenta());
}

/// Shows the script menu. `None` means the operator chose Exit.
fn select_script() -> Result<Option<Script>> {
    let mut items: Vec<String> = Script::ALL.iter().map(|s| s.title().to_string()).collect();
    items.push("Exit".to_string());

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a script to run")
        .items(&items)
        .default(0)
        .interact()
        .context("Cannot show the script menu (not a terminal?). Pass --script instead")?;

    Ok(Script::ALL.get(choice).copied())
}

fn prompt(question: &str) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(question)
        .allow_empty(true)
        .interact_text()
        .context("Cannot read input (not a terminal?). Pass the value as a flag instead")
}

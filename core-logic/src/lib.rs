//! # Core Logic - Shared Cycle Runner for Testnet Scripts
//!
//! This crate provides the chain-agnostic pieces used by every script:
//! the cycle runner, run configuration, wallet loading and logging.
//!
//! ## Modules
//!
//! - [`config`] - Run configuration and operator input parsing
//! - [`cycle`] - The cycle runner and its stages
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Client and template seams
//! - [`utils`] - Utility modules (wallets, randomness, gas, logging)

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod cycle;
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{
    parse_cycle_count, parse_interval_hours, Amount, AmountRange, DelayRange, Pacing, RunConfig,
};
pub use cycle::{
    AccountSelection, CycleResult, CycleRunner, CycleStage, Sleeper, StepFailure, TokioSleeper,
};
pub use error::{ConfigError, CoreError, OperationError, WalletError};
pub use traits::{CycleTemplate, OperationClient, RunSummary, Step};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    sample_amount, sample_delay, setup_logger, validate_private_key, Account, AccountPool,
    GasConfig, GasConfigToml, PrivateKey, RandomSource, StandardGasLimits, ThreadRandom,
    WalletManager, WorkerRunner, NARRATION_TARGET,
};

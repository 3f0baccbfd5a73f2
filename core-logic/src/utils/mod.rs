//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod gas;
pub(crate) mod logger;
pub(crate) mod random;
pub(crate) mod runner;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use gas::{GasConfig, GasConfigToml, StandardGasLimits};
pub use logger::{setup_logger, NARRATION_TARGET};
pub use random::{sample_amount, sample_delay, RandomSource, ThreadRandom};
pub use runner::WorkerRunner;
pub use wallet_manager::{validate_private_key, Account, AccountPool, PrivateKey, WalletManager};

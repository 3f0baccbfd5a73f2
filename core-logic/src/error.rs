//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// Everything wrapped here except [`OperationError`] is fatal: it is raised
/// before the first cycle and ends the process.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Operation(OperationError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<OperationError> for CoreError {
    fn from(e: OperationError) -> Self {
        CoreError::Operation(e)
    }
}

/// Configuration and operator-input errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid input for '{field}': '{input}' ({reason})")]
    InvalidInput {
        field: String,
        input: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Key-file and account errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Key file '{path}' is not a JSON array of strings: {reason}")]
    MalformedKeyFile { path: String, reason: String },

    #[error("Key file '{path}' contains no keys")]
    EmptyKeyFile { path: String },

    #[error("Invalid private key at position {index}: {reason}")]
    InvalidKey { index: usize, reason: String },

    #[error("Wallet not found at index {index} (total wallets: {total})")]
    NotFound { index: usize, total: usize },
}

/// Failures of a single submitted operation. These never end a run; the
/// runner logs them and abandons the current cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Failed to build operation '{label}': {reason}")]
    Build { label: String, reason: String },

    #[error("Submission rejected: {reason}")]
    Submit { reason: String },

    #[error("Confirmation failed for {tx_hash}: {reason}")]
    Confirmation { tx_hash: String, reason: String },

    #[error("Confirmation timeout after {timeout_secs}s for {tx_hash}")]
    ConfirmationTimeout { tx_hash: String, timeout_secs: u64 },

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Transaction {tx_hash} dropped before inclusion")]
    Dropped { tx_hash: String },
}

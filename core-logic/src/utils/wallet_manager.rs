use crate::error::{ConfigError, CoreError, WalletError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A raw hex private key. Wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(***REDACTED***)")
    }
}

/// Checks the textual shape of an EVM private key: 32 bytes of hex, with or
/// without a `0x` prefix, and not the zero key.
pub fn validate_private_key(key: &str) -> Result<(), String> {
    let body = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);

    if body.len() != 64 {
        return Err(format!("expected 64 hex chars, got {}", body.len()));
    }
    let bytes = hex::decode(body).map_err(|_| "not a hex string".to_string())?;
    if bytes.iter().all(|b| *b == 0) {
        return Err("zero key".to_string());
    }
    Ok(())
}

/// One loaded identity. Immutable for the life of the process.
#[derive(Debug, Clone)]
pub struct Account<S> {
    /// Position in the key file.
    pub index: usize,
    pub address: String,
    pub signer: S,
}

impl<S> Account<S> {
    /// Zero-padded, 1-based id used in log lines.
    pub fn id(&self) -> String {
        format!("{:03}", self.index + 1)
    }
}

/// The non-empty, read-only set of accounts a run draws from.
#[derive(Debug)]
pub struct AccountPool<S> {
    accounts: Vec<Account<S>>,
}

impl<S> AccountPool<S> {
    pub fn new(accounts: Vec<Account<S>>) -> Result<Self, WalletError> {
        if accounts.is_empty() {
            return Err(WalletError::NotFound { index: 0, total: 0 });
        }
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Account<S>, WalletError> {
        self.accounts.get(index).ok_or(WalletError::NotFound {
            index,
            total: self.accounts.len(),
        })
    }
}

/// Loads the JSON key file and turns it into accounts, all or nothing.
pub struct WalletManager {
    path: PathBuf,
    keys: Vec<PrivateKey>,
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("path", &self.path)
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl WalletManager {
    pub const KEY_FILE: &'static str = "privateKeys.json";

    /// Reads `path`, falling back to the workspace root (`../../`) when the
    /// binary is started from inside its crate directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let candidates = [path.to_path_buf(), PathBuf::from("../..").join(path)];

        let found = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let content = fs::read_to_string(found).map_err(|e| ConfigError::IoError {
            path: found.display().to_string(),
            msg: e.to_string(),
        })?;

        Ok(Self::from_json(found, &content)?)
    }

    /// Parses and validates every key. A single bad entry rejects the file.
    pub fn from_json(path: impl AsRef<Path>, content: &str) -> Result<Self, WalletError> {
        let path = path.as_ref().to_path_buf();
        let raw: Vec<String> =
            serde_json::from_str(content).map_err(|e| WalletError::MalformedKeyFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if raw.is_empty() {
            return Err(WalletError::EmptyKeyFile {
                path: path.display().to_string(),
            });
        }

        let mut keys = Vec::with_capacity(raw.len());
        for (index, key) in raw.into_iter().enumerate() {
            let key = PrivateKey(key.trim().to_string());
            validate_private_key(key.expose())
                .map_err(|reason| WalletError::InvalidKey { index, reason })?;
            keys.push(key);
        }

        Ok(Self { path, keys })
    }

    /// Returns the number of available wallets
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Builds accounts with a chain-specific signer constructor. The
    /// constructor returns the signer together with its address.
    pub fn into_pool<S, F, E>(self, mut build: F) -> Result<AccountPool<S>, WalletError>
    where
        F: FnMut(&PrivateKey) -> Result<(String, S), E>,
        E: fmt::Display,
    {
        let mut accounts = Vec::with_capacity(self.keys.len());
        for (index, key) in self.keys.iter().enumerate() {
            let (address, signer) = build(key).map_err(|e| WalletError::InvalidKey {
                index,
                reason: e.to_string(),
            })?;
            accounts.push(Account {
                index,
                address,
                signer,
            });
        }
        AccountPool::new(accounts)
    }
}

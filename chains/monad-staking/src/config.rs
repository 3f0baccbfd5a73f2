use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{AmountRange, DelayRange, GasConfig, GasConfigToml, RunConfig, WalletManager};
use ethers::types::Address;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct MonadConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default = "default_key_file")]
    pub private_key_file: String,
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub amount: AmountBounds,
    #[serde(default)]
    pub delay: DelayBounds,
    #[serde(default)]
    pub contracts: Contracts,
    #[serde(default)]
    pub gas: GasConfigToml,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AmountBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for AmountBounds {
    fn default() -> Self {
        let range = AmountRange::default();
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DelayBounds {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayBounds {
    fn default() -> Self {
        let range = DelayRange::default();
        Self {
            min_secs: range.min_secs,
            max_secs: range.max_secs,
        }
    }
}

/// Contract addresses on Monad testnet
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Contracts {
    pub magma: Address,
    pub apriori: Address,
    pub wmon: Address,
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            magma: address(MAGMA_STAKING),
            apriori: address(APRIORI_STAKING),
            wmon: address(WMON),
        }
    }
}

pub const MAGMA_STAKING: &str = "0x2c9C959516e9AAEdB2C748224a41249202ca8BE7";
pub const APRIORI_STAKING: &str = "0xb2f82D0f38dc453D596Ad40A37799446Cc89274A";
pub const WMON: &str = "0x760AfE86e5de5fa0Ee542fc7B7B713e1c5425701";

fn address(hex: &str) -> Address {
    hex.parse().unwrap_or_default()
}

fn default_rpc_url() -> String {
    "https://testnet-rpc.monad.xyz/".to_string()
}

fn default_chain_id() -> u64 {
    10143
}

fn default_explorer_url() -> String {
    "https://testnet.monadexplorer.com/tx/".to_string()
}

fn default_key_file() -> String {
    WalletManager::KEY_FILE.to_string()
}

fn default_confirmation_timeout() -> u64 {
    180
}

fn default_http_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    2000
}

impl MonadConfig {
    /// Loads the TOML file at `path`, then applies `MONAD_*` environment overrides
    /// (for example `MONAD_RPC_URL`). A missing file is an error.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("MONAD"))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    pub fn gas_config(&self) -> GasConfig {
        self.gas.clone().into()
    }

    pub fn to_run_config(&self, cycles: u32, interval_hours: Option<u64>) -> RunConfig {
        RunConfig::new(cycles)
            .with_interval_hours(interval_hours)
            .with_amount(AmountRange::new(self.amount.min, self.amount.max))
            .with_delay(DelayRange::new(self.delay.min_secs, self.delay.max_secs))
            .with_confirmation_timeout(Duration::from_secs(self.confirmation_timeout_secs))
    }
}

/// The `config.toml` shipped next to this crate.
#[cfg(test)]
pub(crate) fn testnet() -> MonadConfig {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
    match MonadConfig::load(path) {
        Ok(config) => config,
        Err(e) => panic!("shipped config failed to load: {}", e),
    }
}

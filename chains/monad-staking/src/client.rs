use crate::config::MonadConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{Account, Amount, OperationClient, OperationError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, Eip1559TransactionRequest, TxHash, U256, U64};
use std::time::Duration;
use tracing::debug;

/// A single contract call as it will be signed and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
    pub gas_limit: u64,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>, gas_limit: u64) -> Self {
        Self {
            to,
            data: data.into(),
            value: None,
            gas_limit,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn to_request(&self, from: Address) -> Eip1559TransactionRequest {
        let tx = Eip1559TransactionRequest::new()
            .from(from)
            .to(self.to)
            .data(self.data.clone())
            .gas(self.gas_limit);
        match self.value {
            Some(value) => tx.value(value),
            None => tx,
        }
    }
}

/// Converts a four-decimal MON amount to wei.
pub fn to_wei(amount: Amount) -> Result<U256, OperationError> {
    ethers::utils::parse_ether(amount.to_decimal_string()).map_err(|e| OperationError::Build {
        label: format!("{} MON", amount),
        reason: e.to_string(),
    })
}

pub fn parse_wallet(key: &str, chain_id: u64) -> Result<LocalWallet> {
    let wallet = key
        .parse::<LocalWallet>()
        .context("Invalid private key")?;
    Ok(wallet.with_chain_id(chain_id))
}

/// JSON-RPC client for Monad testnet.
///
/// Nonce, fee and chain id are filled by `SignerMiddleware` at submit time.
#[derive(Debug, Clone)]
pub struct MonadClient {
    provider: Provider<Http>,
    explorer_url: String,
}

impl MonadClient {
    pub fn new(config: &MonadConfig) -> Result<Self> {
        let url = reqwest::Url::parse(&config.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", config.rpc_url))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let provider = Provider::new(Http::new_with_client(url, http))
            .interval(Duration::from_millis(config.poll_interval_ms));

        Ok(Self {
            provider,
            explorer_url: config.explorer_url.clone(),
        })
    }
}

#[async_trait]
impl OperationClient for MonadClient {
    type Signer = LocalWallet;
    type Operation = ContractCall;
    type Pending = TxHash;

    async fn submit(
        &self,
        account: &Account<LocalWallet>,
        call: &ContractCall,
    ) -> Result<TxHash, OperationError> {
        let client = SignerMiddleware::new(self.provider.clone(), account.signer.clone());
        let tx = call.to_request(account.signer.address());

        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| OperationError::Submit {
                reason: e.to_string(),
            })?;
        let hash = pending.tx_hash();
        debug!("Sent {:?} from {}", hash, account.address);
        Ok(hash)
    }

    async fn confirm(&self, hash: &TxHash) -> Result<String, OperationError> {
        let tx_hash = format!("{:?}", hash);
        let receipt = PendingTransaction::new(*hash, &self.provider)
            .await
            .map_err(|e| OperationError::Confirmation {
                tx_hash: tx_hash.clone(),
                reason: e.to_string(),
            })?;

        match receipt {
            Some(receipt) if receipt.status == Some(U64::from(1)) => {
                Ok(format!("{:?}", receipt.transaction_hash))
            }
            Some(_) => Err(OperationError::Reverted { tx_hash }),
            None => Err(OperationError::Dropped { tx_hash }),
        }
    }

    fn tx_hash(&self, hash: &TxHash) -> String {
        format!("{:?}", hash)
    }

    fn explorer_link(&self, hash: &TxHash) -> String {
        format!("{}{:?}", self.explorer_url, hash)
    }
}

use crate::client::{to_wei, ContractCall, MonadClient};
use crate::task::missing_amount;
use anyhow::Result;
use core_logic::{Account, Amount, CycleTemplate, GasConfig, OperationError, Step};
use ethers::prelude::*;

const WMON_ABI: &str = r#"[
    {"type":"function","name":"deposit","stateMutability":"payable","inputs":[],"outputs":[]},
    {"type":"function","name":"withdraw","stateMutability":"nonpayable","inputs":[{"name":"wad","type":"uint256"}],"outputs":[]}
]"#;

/// Wrap MON into WMON and unwrap the same amount straight back.
pub struct WmonWrapTask {
    contract: Address,
    abi: BaseContract,
    gas: GasConfig,
}

impl WmonWrapTask {
    pub fn new(contract: Address, gas: GasConfig) -> Result<Self> {
        let abi: abi::Abi = serde_json::from_str(WMON_ABI)?;
        Ok(Self {
            contract,
            abi: BaseContract::from(abi),
            gas,
        })
    }

    fn encode<T: abi::Tokenize>(&self, function: &str, args: T) -> Result<Bytes, OperationError> {
        self.abi
            .encode(function, args)
            .map_err(|e| OperationError::Build {
                label: function.to_string(),
                reason: e.to_string(),
            })
    }
}

impl CycleTemplate<MonadClient> for WmonWrapTask {
    fn name(&self) -> &str {
        "03_wmonWrap"
    }

    fn requires_amount(&self) -> bool {
        true
    }

    fn build(
        &self,
        _account: &Account<LocalWallet>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<ContractCall>>, OperationError> {
        let amount = amount.ok_or_else(|| missing_amount("wrap"))?;
        let wei = to_wei(amount)?;

        let wrap = ContractCall::new(
            self.contract,
            self.encode("deposit", ())?,
            self.gas.limit_wrap(),
        )
        .with_value(wei);
        let unwrap = ContractCall::new(
            self.contract,
            self.encode("withdraw", wei)?,
            self.gas.limit_unwrap(),
        );

        Ok(vec![
            Step::submit(format!("Wrap {} MON", amount), wrap),
            Step::submit(format!("Unwrap {} WMON", amount), unwrap),
        ])
    }
}

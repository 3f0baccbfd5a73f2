use crate::client::{to_wei, ContractCall, MonadClient};
use crate::task::{calldata, missing_amount};
use core_logic::{Account, Amount, CycleTemplate, GasConfig, OperationError, Step};
use ethers::abi::Token;
use ethers::prelude::*;

/// ERC-4626 `deposit(uint256 assets, address receiver)`
pub const DEPOSIT_SELECTOR: [u8; 4] = [0x6e, 0x55, 0x3f, 0x65];

/// Deposit MON into the aprMON vault on behalf of the signing wallet, then
/// hold for a random delay before the cycle ends.
pub struct AprioriStakeTask {
    contract: Address,
    gas: GasConfig,
}

impl AprioriStakeTask {
    pub fn new(contract: Address, gas: GasConfig) -> Self {
        Self { contract, gas }
    }
}

impl CycleTemplate<MonadClient> for AprioriStakeTask {
    fn name(&self) -> &str {
        "02_aprioriStake"
    }

    fn requires_amount(&self) -> bool {
        true
    }

    fn build(
        &self,
        account: &Account<LocalWallet>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<ContractCall>>, OperationError> {
        let amount = amount.ok_or_else(|| missing_amount("apriori stake"))?;
        let wei = to_wei(amount)?;
        let receiver = account.signer.address();

        let deposit = ContractCall::new(
            self.contract,
            calldata(
                DEPOSIT_SELECTOR,
                &[Token::Uint(wei), Token::Address(receiver)],
            ),
            self.gas.limit_stake(),
        )
        .with_value(wei);

        Ok(vec![
            Step::submit(format!("Stake {} MON", amount), deposit),
            Step::Settle,
        ])
    }
}

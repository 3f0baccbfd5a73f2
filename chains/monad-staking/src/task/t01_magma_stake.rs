use crate::client::{to_wei, ContractCall, MonadClient};
use crate::task::{calldata, missing_amount};
use core_logic::{Account, Amount, CycleTemplate, GasConfig, OperationError, Step};
use ethers::abi::Token;
use ethers::prelude::*;

/// Payable stake entry, no arguments
pub const STAKE_SELECTOR: [u8; 4] = [0xd5, 0x57, 0x59, 0x82];
/// Unstake entry taking a uint256 amount
pub const UNSTAKE_SELECTOR: [u8; 4] = [0x6f, 0xed, 0x1e, 0xa7];

/// Stake MON into Magma for gMON, wait, then unstake the same amount.
pub struct MagmaStakeTask {
    contract: Address,
    gas: GasConfig,
}

impl MagmaStakeTask {
    pub fn new(contract: Address, gas: GasConfig) -> Self {
        Self { contract, gas }
    }
}

impl CycleTemplate<MonadClient> for MagmaStakeTask {
    fn name(&self) -> &str {
        "01_magmaStake"
    }

    fn requires_amount(&self) -> bool {
        true
    }

    fn build(
        &self,
        _account: &Account<LocalWallet>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<ContractCall>>, OperationError> {
        let amount = amount.ok_or_else(|| missing_amount("magma stake"))?;
        let wei = to_wei(amount)?;

        let stake = ContractCall::new(
            self.contract,
            calldata(STAKE_SELECTOR, &[]),
            self.gas.limit_stake(),
        )
        .with_value(wei);

        let unstake = ContractCall::new(
            self.contract,
            calldata(UNSTAKE_SELECTOR, &[Token::Uint(wei)]),
            self.gas.limit_unstake(),
        );

        Ok(vec![
            Step::submit(format!("Stake {} MON", amount), stake),
            Step::Settle,
            Step::submit(format!("Unstake {} gMON", amount), unstake),
        ])
    }
}

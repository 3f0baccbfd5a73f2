use core_logic::OperationError;
use ethers::abi::{self, Token};
use ethers::types::Bytes;

pub mod t01_magma_stake;
pub mod t02_apriori_stake;
pub mod t03_wmon_wrap;

pub use self::t01_magma_stake::MagmaStakeTask;
pub use self::t02_apriori_stake::AprioriStakeTask;
pub use self::t03_wmon_wrap::WmonWrapTask;

/// Selector followed by the ABI-encoded arguments.
pub fn calldata(selector: [u8; 4], args: &[Token]) -> Bytes {
    let mut data = selector.to_vec();
    data.extend(abi::encode(args));
    data.into()
}

pub(crate) fn missing_amount(label: &str) -> OperationError {
    OperationError::Build {
        label: label.to_string(),
        reason: "no amount drawn for this cycle".to_string(),
    }
}

//! # Core Logic - Gas Configuration
//!
//! Gas-limit ceilings attached to every operation. Fee estimation stays with
//! the chain client; this module only carries the caps.

use serde::Deserialize;

/// Standard gas limits for the cycle templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardGasLimits {
    pub stake: u64,
    pub unstake: u64,
    pub wrap: u64,
    pub unwrap: u64,
}

impl Default for StandardGasLimits {
    fn default() -> Self {
        Self {
            stake: 500_000,
            unstake: 800_000,
            wrap: 500_000,
            unwrap: 500_000,
        }
    }
}

/// Configuration for gas management
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasConfig {
    pub limits: StandardGasLimits,
}

impl GasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: StandardGasLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limit_stake(&self) -> u64 {
        self.limits.stake
    }

    pub fn limit_unstake(&self) -> u64 {
        self.limits.unstake
    }

    pub fn limit_wrap(&self) -> u64 {
        self.limits.wrap
    }

    pub fn limit_unwrap(&self) -> u64 {
        self.limits.unwrap
    }
}

/// Deserialize helper for GasConfig from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GasConfigToml {
    pub limit_stake: Option<u64>,
    pub limit_unstake: Option<u64>,
    pub limit_wrap: Option<u64>,
    pub limit_unwrap: Option<u64>,
}

impl From<GasConfigToml> for GasConfig {
    fn from(toml: GasConfigToml) -> Self {
        let defaults = StandardGasLimits::default();
        Self {
            limits: StandardGasLimits {
                stake: toml.limit_stake.unwrap_or(defaults.stake),
                unstake: toml.limit_unstake.unwrap_or(defaults.unstake),
                wrap: toml.limit_wrap.unwrap_or(defaults.wrap),
                unwrap: toml.limit_unwrap.unwrap_or(defaults.unwrap),
            },
        }
    }
}

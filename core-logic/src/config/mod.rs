//! Run configuration shared by every cycle template.
//!
//! Values are read once at start-up (TOML file plus operator prompts) and are
//! immutable afterwards.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Decimal precision of sampled amounts.
pub const AMOUNT_DECIMALS: u32 = 4;
const AMOUNT_SCALE: u64 = 10u64.pow(AMOUNT_DECIMALS);

/// A token amount with exactly [`AMOUNT_DECIMALS`] decimal places, stored as
/// an integer count of `10^-4` units so the decimal rendering is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    units: u64,
}

impl Amount {
    pub const fn from_units(units: u64) -> Self {
        Self { units }
    }

    pub fn units(&self) -> u64 {
        self.units
    }

    pub fn as_f64(&self) -> f64 {
        self.units as f64 / AMOUNT_SCALE as f64
    }

    /// Decimal string such as `"0.0123"`, suitable for base-unit parsers.
    pub fn to_decimal_string(&self) -> String {
        format!(
            "{}.{:0width$}",
            self.units / AMOUNT_SCALE,
            self.units % AMOUNT_SCALE,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Inclusive bounds for randomized amounts, in whole tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 0.05,
        }
    }
}

impl AmountRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest and largest representable amounts inside the bounds.
    ///
    /// The epsilon absorbs float noise such as `0.07 * 10^4 = 700.0000000000001`.
    pub fn unit_bounds(&self) -> (u64, u64) {
        let scale = AMOUNT_SCALE as f64;
        let lo = (self.min * scale - 1e-6).ceil().max(0.0) as u64;
        let hi = (self.max * scale + 1e-6).floor().max(0.0) as u64;
        (lo, hi)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "amount".to_string(),
                reason: format!("bounds must be finite and non-negative ({:?})", self),
            });
        }
        let (lo, hi) = self.unit_bounds();
        if lo > hi {
            return Err(ConfigError::InvalidValue {
                field: "amount".to_string(),
                reason: format!(
                    "no {}-decimal amount between {} and {}",
                    AMOUNT_DECIMALS, self.min, self.max
                ),
            });
        }
        Ok(())
    }
}

/// Inclusive bounds for randomized delays, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_secs: 60,
            max_secs: 180,
        }
    }
}

impl DelayRange {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_secs > self.max_secs {
            return Err(ConfigError::InvalidValue {
                field: "delay".to_string(),
                reason: format!(
                    "min_secs ({}) is greater than max_secs ({})",
                    self.min_secs, self.max_secs
                ),
            });
        }
        Ok(())
    }
}

/// How the pause between two cycles is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Fixed(Duration),
    Random(DelayRange),
}

/// Operator-supplied parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub cycles: u32,
    pub interval_hours: Option<u64>,
    pub amount: AmountRange,
    pub delay: DelayRange,
    pub confirmation_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycles: 1,
            interval_hours: None,
            amount: AmountRange::default(),
            delay: DelayRange::default(),
            confirmation_timeout: Duration::from_secs(180),
        }
    }
}

impl RunConfig {
    pub fn new(cycles: u32) -> Self {
        Self {
            cycles,
            ..Default::default()
        }
    }

    pub fn with_interval_hours(mut self, hours: Option<u64>) -> Self {
        self.interval_hours = hours;
        self
    }

    pub fn with_amount(mut self, amount: AmountRange) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles == 0 {
            return Err(ConfigError::InvalidInput {
                field: "cycles".to_string(),
                input: "0".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.interval_hours == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "interval_hours".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.confirmation_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "confirmation_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.amount.validate()?;
        self.delay.validate()
    }

    /// A fixed interval, when given, replaces the randomized delay.
    pub fn pacing(&self) -> Pacing {
        match self.interval_hours {
            Some(hours) => Pacing::Fixed(Duration::from_secs(hours.saturating_mul(3600))),
            None => Pacing::Random(self.delay),
        }
    }
}

/// Parses the operator's cycle count.
///
/// Empty input falls back to `default` when one is offered; anything that is
/// not a positive integer is rejected.
pub fn parse_cycle_count(input: &str, default: Option<u32>) -> Result<u32, ConfigError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| ConfigError::InvalidInput {
        field: "cycles".to_string(),
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return default.ok_or_else(|| invalid("a cycle count is required"));
    }

    let value: i64 = trimmed
        .parse()
        .map_err(|_| invalid("must be a positive integer"))?;
    if value <= 0 {
        return Err(invalid("must be a positive integer"));
    }
    u32::try_from(value).map_err(|_| invalid("too large"))
}

/// Parses the optional interval prompt. Empty input means "use the
/// randomized delay".
pub fn parse_interval_hours(input: &str) -> Result<Option<u64>, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u64>() {
        Ok(hours) if hours > 0 => Ok(Some(hours)),
        _ => Err(ConfigError::InvalidInput {
            field: "interval_hours".to_string(),
            input: trimmed.to_string(),
            reason: "must be a positive whole number of hours".to_string(),
        }),
    }
}

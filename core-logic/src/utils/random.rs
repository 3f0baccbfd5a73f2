//! # Core Logic - Randomized Pacing
//!
//! Amount, delay and account draws used by the cycle runner. The runner only
//! sees the [`RandomSource`] trait so tests can script exact sequences.

use crate::config::{Amount, AmountRange, DelayRange};
use rand::Rng;
use std::time::Duration;

/// Uniform amount in `range`, on the 4-decimal grid.
pub fn sample_amount<R: Rng + ?Sized>(rng: &mut R, range: &AmountRange) -> Amount {
    let (lo, hi) = range.unit_bounds();
    if lo >= hi {
        return Amount::from_units(lo);
    }
    Amount::from_units(rng.gen_range(lo..=hi))
}

/// Uniform whole-second delay in `range`.
pub fn sample_delay<R: Rng + ?Sized>(rng: &mut R, range: &DelayRange) -> Duration {
    if range.min_secs >= range.max_secs {
        return Duration::from_secs(range.min_secs);
    }
    Duration::from_secs(rng.gen_range(range.min_secs..=range.max_secs))
}

/// Source of every random decision a run makes.
pub trait RandomSource: Send + Sync {
    fn amount(&self, range: &AmountRange) -> Amount;

    fn delay(&self, range: &DelayRange) -> Duration;

    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn amount(&self, range: &AmountRange) -> Amount {
        sample_amount(&mut rand::thread_rng(), range)
    }

    fn delay(&self, range: &DelayRange) -> Duration {
        sample_delay(&mut rand::thread_rng(), range)
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }
}

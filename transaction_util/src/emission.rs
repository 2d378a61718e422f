//! Block reward schedule

use common::constants::{
    BLOCK_GRANTED_FULL_REWARD_ZONE, DONATIONS_MAX_PERCENT, EMISSION_CURVE_CHARACTER,
    MONEY_SUPPLY, ROYALTY_PERCENT_OF_DONATION,
};
use ensure_macro::ensure;

use crate::{Error, Result};

/// Computes how much a block may create
pub trait EmissionCurve {
    /// Reward of a block of `current_block_size` bytes, before fees
    ///
    /// # Errors
    /// If the block is too large to be accepted at all
    fn block_reward(
        &self,
        median_size: usize,
        current_block_size: usize,
        already_generated_coins: u64,
    ) -> Result<u64>;

    /// How much of the supply may still be donated
    fn donation_allowance(&self, already_generated_coins: u64, already_donated_coins: u64) -> u64 {
        (already_generated_coins / 100 * DONATIONS_MAX_PERCENT)
            .saturating_sub(already_donated_coins)
    }
}

/// Smooth emission with a quadratic penalty for blocks above the median size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultEmissionCurve;

impl EmissionCurve for DefaultEmissionCurve {
    fn block_reward(
        &self,
        median_size: usize,
        current_block_size: usize,
        already_generated_coins: u64,
    ) -> Result<u64> {
        let base_reward = (MONEY_SUPPLY - already_generated_coins) >> EMISSION_CURVE_CHARACTER;

        let median_size = median_size.max(BLOCK_GRANTED_FULL_REWARD_ZONE);
        if current_block_size <= median_size {
            return Ok(base_reward);
        }
        ensure!(
            current_block_size <= median_size.saturating_mul(2),
            Error::BlockTooBig {
                size: current_block_size,
                median: median_size,
            }
        );

        // base * (2m - s) * s / m^2
        let median = median_size as u128;
        let size = current_block_size as u128;
        let penalized = u128::from(base_reward) * (2 * median - size) * size / (median * median);

        Ok(penalized as u64)
    }
}

/// Splits a donation into the part kept for donations and the royalty
///
/// # Returns
/// `(donation, royalty)`
pub fn get_donation_and_royalty(amount_to_donate: u64) -> (u64, u64) {
    let royalty = amount_to_donate / 100 * ROYALTY_PERCENT_OF_DONATION;
    (amount_to_donate - royalty, royalty)
}

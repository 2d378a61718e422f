//! Module for constructing coinbase transactions

use log::debug;

use common::{
    constants::MINED_MONEY_UNLOCK_WINDOW,
    Address, AliasInfo, TXIn, Transaction, TransactionPrefix, MIX_ATTR_NO_MIX_LIMIT,
};
use crypto::KeyPair;
use ensure_macro::ensure;

use crate::{
    config::{Config, DonationAccounts},
    decompose::decompose_amount_into_digits,
    emission::{get_donation_and_royalty, EmissionCurve},
    tx_construction::{construct_tx_out, TXDestination},
    Error, Result,
};

/// Block parameters the coinbase depends on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinerTxArg {
    /// Height of the block being mined
    pub height: u64,
    /// Median size of the recent blocks
    pub median_size: usize,
    /// Coins created before this block
    pub already_generated_coins: u64,
    /// Size of the block being mined
    pub current_block_size: usize,
    /// Fees of the transactions included in the block
    pub fee: u64,
    /// Receives the reward
    pub miner_address: Address,
    /// Free-form bytes for the miner, placed in the extra nonce
    pub extra_nonce: Vec<u8>,
    /// Maximum number of outputs paying the miner
    pub max_outs: usize,
    /// Low digits of the miner's share up to this amount are paid as one output
    pub dust_threshold: u64,
}

impl MinerTxArg {
    /// A coinbase for an empty block at `height`, split as `config` says
    pub fn new(config: &Config, height: u64, miner_address: Address) -> Self {
        MinerTxArg {
            height,
            median_size: 0,
            already_generated_coins: 0,
            current_block_size: 0,
            fee: 0,
            miner_address,
            extra_nonce: Vec::new(),
            max_outs: config.miner_tx_max_outs,
            dust_threshold: config.dust_threshold,
        }
    }
}

/// Donation parameters of the coinbase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DonationArg {
    /// Coins donated before this block
    pub already_donated_coins: u64,
    /// Part of the reward the miner gives away
    pub amount_to_donate: u64,
    /// Receivers of the donation and royalty
    pub accounts: DonationAccounts,
}

/// Splits the miner's share into digit outputs, merging the largest ones down to `max_outs`
fn split_miner_reward(amount: u64, dust_threshold: u64, max_outs: usize) -> Vec<u64> {
    let mut amounts = Vec::new();
    let mut dust = 0;
    decompose_amount_into_digits(
        amount,
        dust_threshold,
        |chunk| amounts.push(chunk),
        |amount| dust = amount,
    );
    if dust != 0 {
        amounts.insert(0, dust);
    }

    let max_outs = max_outs.max(1);
    while amounts.len() > max_outs {
        if let Some(last) = amounts.pop() {
            if let Some(previous) = amounts.last_mut() {
                *previous += last;
            }
        }
    }
    amounts
}

fn build_miner_tx<C: EmissionCurve>(
    curve: &C,
    arg: &MinerTxArg,
    donation: Option<&DonationArg>,
    alias: Option<AliasInfo>,
) -> Result<Transaction> {
    let reward = curve
        .block_reward(
            arg.median_size,
            arg.current_block_size,
            arg.already_generated_coins,
        )?
        .checked_add(arg.fee)
        .ok_or(Error::MoneyOverflow)?;

    let amount_to_donate = match donation {
        Some(donation) => {
            let allowed = curve
                .donation_allowance(arg.already_generated_coins, donation.already_donated_coins)
                .min(reward);
            ensure!(
                donation.amount_to_donate <= allowed,
                Error::DonationTooLarge {
                    requested: donation.amount_to_donate,
                    allowed,
                }
            );
            donation.amount_to_donate
        }
        None => 0,
    };

    let mut recipients: Vec<TXDestination> =
        split_miner_reward(reward - amount_to_donate, arg.dust_threshold, arg.max_outs)
            .into_iter()
            .map(|amount| TXDestination {
                amount,
                address: arg.miner_address,
            })
            .collect();
    if let Some(donation) = donation {
        let (donation_amount, royalty) = get_donation_and_royalty(amount_to_donate);
        for (amount, address) in &[
            (royalty, donation.accounts.royalty),
            (donation_amount, donation.accounts.donation),
        ] {
            if *amount != 0 {
                recipients.push(TXDestination {
                    amount: *amount,
                    address: *address,
                });
            }
        }
    }

    let tx_keypair = KeyPair::generate();
    let mut prefix = TransactionPrefix::new(arg.height + MINED_MONEY_UNLOCK_WINDOW);
    prefix.add_tx_pub_key_to_extra(tx_keypair.public_key);
    if !arg.extra_nonce.is_empty() {
        prefix.add_tx_extra_nonce(arg.extra_nonce.clone())?;
    }
    if let Some(alias) = alias {
        prefix.add_tx_extra_alias(alias)?;
    }
    prefix.inputs.push(TXIn::Gen(arg.height));

    let mut paid: u64 = 0;
    for (output_index, recipient) in recipients.iter().enumerate() {
        prefix.outputs.push(construct_tx_out(
            recipient,
            &tx_keypair,
            output_index as u64,
            MIX_ATTR_NO_MIX_LIMIT,
        )?);
        paid = paid
            .checked_add(recipient.amount)
            .ok_or(Error::MoneyOverflow)?;
    }
    ensure!(paid == reward, Error::RewardMismatch { paid, reward });

    debug!(
        "Miner transaction at height {} pays {} over {} outputs ({} donated)",
        arg.height,
        reward,
        recipients.len(),
        amount_to_donate
    );

    Ok(Transaction::unsigned(prefix))
}

/// Constructs the coinbase paying the whole reward and the fees to the miner
pub fn construct_miner_tx<C: EmissionCurve>(curve: &C, arg: &MinerTxArg) -> Result<Transaction> {
    build_miner_tx(curve, arg, None, None)
}

/// Constructs the coinbase giving `amount_to_donate` away, optionally registering an alias
///
/// # Errors
/// If the donation is larger than the allowance or the reward
pub fn construct_miner_tx_with_donations<C: EmissionCurve>(
    curve: &C,
    arg: &MinerTxArg,
    donation: &DonationArg,
    alias: Option<AliasInfo>,
) -> Result<Transaction> {
    build_miner_tx(curve, arg, Some(donation), alias)
}

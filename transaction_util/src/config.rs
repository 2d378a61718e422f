//! Construction settings, settable from the command line

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use common::{
    constants::{DEFAULT_DUST_THRESHOLD, MINER_TX_MAX_OUTS},
    Address, MIX_ATTR_NO_MIX_LIMIT,
};
use crypto::ecc::hash_to_scalar;

use crate::AccountKeys;

/// Tunables of transaction and miner transaction construction
#[derive(StructOpt, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    /// Amounts up to this are split off as dust
    #[structopt(long, default_value = "1000000")]
    pub dust_threshold: u64,

    /// Outputs of a miner transaction are merged down to this count
    #[structopt(long, default_value = "11")]
    pub miner_tx_max_outs: usize,

    /// Mix attribute given to new outputs
    #[structopt(long, default_value = "0")]
    pub default_mix_attr: u8,

    /// Seed of the account receiving donations
    #[structopt(long, default_value = "boolberry donation account")]
    pub donation_account_seed: String,

    /// Seed of the account receiving royalties
    #[structopt(long, default_value = "boolberry royalty account")]
    pub royalty_account_seed: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            miner_tx_max_outs: MINER_TX_MAX_OUTS,
            default_mix_attr: MIX_ATTR_NO_MIX_LIMIT,
            donation_account_seed: "boolberry donation account".to_string(),
            royalty_account_seed: "boolberry royalty account".to_string(),
        }
    }
}

/// Addresses paid by the donation form of the miner transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DonationAccounts {
    /// Receives the donations
    pub donation: Address,
    /// Receives the royalty share of the donations
    pub royalty: Address,
}

impl Config {
    fn account_from_seed(seed: &str) -> AccountKeys {
        AccountKeys::from(hash_to_scalar(seed.as_bytes()))
    }

    /// Derives the donation and royalty accounts from their seeds
    pub fn donation_accounts(&self) -> DonationAccounts {
        DonationAccounts {
            donation: Self::account_from_seed(&self.donation_account_seed).address(),
            royalty: Self::account_from_seed(&self.royalty_account_seed).address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_command_line() {
        let parsed = Config::from_iter(&["test"]);
        assert_eq!(parsed, Config::default());

        let parsed = Config::from_iter(&["test", "--dust-threshold", "10", "--miner-tx-max-outs", "3"]);
        assert_eq!(parsed.dust_threshold, 10);
        assert_eq!(parsed.miner_tx_max_outs, 3);
    }

    #[test]
    fn donation_accounts_are_deterministic() {
        let config = Config::default();
        let accounts = config.donation_accounts();
        assert_eq!(accounts, config.donation_accounts());
        assert_ne!(accounts.donation, accounts.royalty);
        assert!(accounts.donation.is_valid());

        let other = Config {
            royalty_account_seed: "another seed".to_string(),
            ..Config::default()
        };
        assert_eq!(other.donation_accounts().donation, accounts.donation);
        assert_ne!(other.donation_accounts().royalty, accounts.royalty);
    }
}

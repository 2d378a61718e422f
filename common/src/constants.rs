//! Currency parameters shared by every component

/// Version written into new transactions
pub const CURRENT_TRANSACTION_VERSION: u64 = 1;
/// Block versions written into new blocks
pub const CURRENT_BLOCK_MAJOR_VERSION: u8 = 1;
pub const CURRENT_BLOCK_MINOR_VERSION: u8 = 0;

/// Number of blocks a coinbase output stays locked for
pub const MINED_MONEY_UNLOCK_WINDOW: u64 = 10;

/// Number of decimal places in a printed amount
pub const DISPLAY_DECIMAL_POINT: usize = 12;
/// Atomic units in one coin
pub const COIN: u64 = 1_000_000_000_000;
pub const MONEY_SUPPLY: u64 = u64::max_value();
pub const EMISSION_CURVE_CHARACTER: u32 = 20;

/// Cumulative block size up to which the full reward is paid
pub const BLOCK_GRANTED_FULL_REWARD_ZONE: usize = 20_000;
/// Amounts below this are split off as dust
pub const DEFAULT_DUST_THRESHOLD: u64 = 1_000_000;
/// Outputs of a miner transaction are merged down to this count
pub const MINER_TX_MAX_OUTS: usize = 11;

pub const MAX_ALIAS_LEN: usize = 255;
/// Upper bound of the donation share of the reward, in percent
pub const DONATIONS_MAX_PERCENT: u64 = 10;
/// Share of the donation paid as royalty, in percent
pub const ROYALTY_PERCENT_OF_DONATION: u64 = 10;

pub const PUBLIC_ADDRESS_BASE58_PREFIX: u64 = 0x1;

pub const GENESIS_NONCE: u64 = 101_010_101;

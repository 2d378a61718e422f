/// Error type for building and scanning transactions
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when an object or extra record is invalid
    #[error(transparent)]
    Common(#[from] common::Error),

    /// Returned when a signature can't be generated
    #[error(transparent)]
    Crypto(#[from] crypto::Error),

    /// Returned when a construction context can't be (de)serialized
    #[error(transparent)]
    Serialization(#[from] bincode::Error),

    /// Returned when there are no transaction sources
    #[error("No transaction sources")]
    NoSources,

    /// Returned when there are no transaction destinations
    #[error("No transaction destinations")]
    NoDestinations,

    /// Returned when the index of the real output is beyond the ring provided
    #[error("Real output index {index} is beyond a ring of {ring_size} outputs")]
    RealIndexOutOfBounds {
        /// Position of the real output
        index: usize,
        /// Number of outputs in the ring
        ring_size: usize,
    },

    /// Returned when outputs and fee spend more than the sources provide
    #[error("Outputs ({outputs}) exceed inputs ({inputs})")]
    InvalidAmount {
        /// Sum of the sources
        inputs: u64,
        /// Sum of the destinations and fee
        outputs: u64,
    },

    /// Returned when a destination pays nothing
    #[error("Destination {0} has a zero amount")]
    ZeroAmountDestination(usize),

    /// Returned when summing amounts overflows
    #[error("Amount sum overflows")]
    MoneyOverflow,

    /// Returned when a key can't be used for a key derivation
    #[error("Key derivation failed")]
    KeyDerivation,

    /// Returned when the account doesn't own the output it's trying to spend
    #[error("Account keys don't match output {output_index} of the source transaction")]
    KeyImageMismatch {
        /// Index of the output in its transaction
        output_index: u64,
    },

    /// Returned when the spend secret key doesn't match the public one, or the keys belong to
    /// another account than the request
    #[error("Spend keys don't match the sender's spend public key")]
    SpendKeyMismatch,

    /// Returned when a payment ID isn't 32 bytes long
    #[error("Invalid payment ID")]
    InvalidPaymentId,

    /// Returned when the block is too large to receive any reward
    #[error("Block of {size} bytes exceeds twice the median of {median}")]
    BlockTooBig {
        /// Size of the block
        size: usize,
        /// Median the size is compared against
        median: usize,
    },

    /// Returned when the requested donation is more than the donation allowance
    #[error("Donation of {requested} exceeds the allowed {allowed}")]
    DonationTooLarge {
        /// Amount the miner wants to donate
        requested: u64,
        /// Amount that may still be donated
        allowed: u64,
    },

    /// Returned when the split outputs don't add up to the block reward
    #[error("Miner transaction pays {paid} instead of {reward}")]
    RewardMismatch {
        /// Sum of the outputs
        paid: u64,
        /// Reward and fees of the block
        reward: u64,
    },
}

/// Result type of this crate
pub type Result<T> = std::result::Result<T, Error>;

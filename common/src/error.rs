use crate::DecodeError;

/// Error type for structural checks on consensus objects
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Address(#[from] crate::address::AddressError),

    /// A sum of amounts exceeds `u64`
    #[error("Amount sum overflows")]
    MoneyOverflow,

    /// Outputs spend more than the inputs provide
    #[error("Outputs ({outputs}) exceed inputs ({inputs})")]
    NegativeFee { inputs: u64, outputs: u64 },

    #[error("Expected a {expected} input, found a {found} input")]
    UnexpectedInputType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Expected a {expected} output, found a {found} output")]
    UnexpectedOutputType {
        expected: &'static str,
        found: &'static str,
    },

    /// Only key inputs can be spent by a non-coinbase transaction
    #[error("Input {0} has an unsupported type")]
    UnsupportedInput(usize),

    #[error("Output {index} is invalid: {reason}")]
    InvalidOutput { index: usize, reason: &'static str },

    #[error("Miner transaction must have exactly one generation input")]
    InvalidMinerTx,

    #[error("Transaction extra has no public key")]
    MissingTxPublicKey,

    #[error("Transaction extra has more than one {0} field")]
    DuplicateExtraField(&'static str),

    /// Variable length extra payloads carry a one byte length
    #[error("Extra field payload of {0} bytes exceeds 255")]
    ExtraFieldTooLong(usize),

    /// Padding and unrecognised records run to the end of the field
    #[error("Extra {0} record must be the last one")]
    MisplacedExtraField(&'static str),

    /// The records would not decode back from their own bytes
    #[error("Extra field does not survive re-encoding")]
    NonCanonicalExtra,

    #[error("Invalid alias name {0:?}")]
    InvalidAlias(String),

    #[error("Alias comment of {0} bytes exceeds 255")]
    AliasCommentTooLong(usize),

    #[error("Alias signature does not verify")]
    InvalidAliasSignature,

    #[error("Invalid amount string {0:?}")]
    InvalidAmountString(String),

    #[error("Invalid hex string")]
    InvalidHex,
}

pub type Result<T> = std::result::Result<T, Error>;

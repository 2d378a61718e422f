//! Consensus object model of the currency: transactions, blocks, their canonical byte
//! encoding and the hashes computed over it

pub mod address;
pub mod alias;
pub mod amount;
mod block;
pub mod codec;
pub mod constants;
mod error;
pub mod extra;
pub mod pow;
mod traits;
mod transaction;

pub use address::{Address, AddressError, AddressPrefixes, MainNet};
pub use alias::{validate_alias_name, AliasInfo};
pub use block::{get_tx_tree_hash, Block, BlockHeader};
pub use codec::{Decode, DecodeError, Encode};
pub use error::{Error, Result};
pub use extra::{TXExtra, TxExtraInfo};
pub use traits::GetHash;
pub use transaction::{
    absolute_output_offsets_to_relative, is_mixattr_applicable_for_fake_outs_counter,
    relative_output_offsets_to_absolute, TXIn, TXInToKey, TXOut, TXOutTarget, TXOutToKey,
    TXOutToScript, Transaction, TransactionPrefix, MIX_ATTR_NO_MIX, MIX_ATTR_NO_MIX_LIMIT,
};

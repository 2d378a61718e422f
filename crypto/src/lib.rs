//! Cryptographic primitives for a CryptoNote currency
//!
//! Everything here operates on ed25519 points and scalars, hashed with the original
//! (pre-standard) Keccak-256 variant.

#[macro_use]
extern crate arrayref;

pub mod ecc;
mod error;
mod field;
pub mod hash;
pub mod keys;
pub mod ring_signature;
pub mod signature;
pub mod tree_hash;
pub mod wild_keccak;

pub use curve25519_dalek;
pub use error::Error;
pub use hash::{cn_fast_hash, CNFastHash, Hash256, Hash256Data};
pub use keys::{KeyImage, KeyPair, PublicKey, SecretKey};
pub use signature::Signature;

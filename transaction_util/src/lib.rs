#![deny(missing_docs)]
//! Utilities for building, scanning and paying out transactions

mod account_keys;
pub mod config;
pub mod decompose;
mod derivation;
pub mod emission;
mod error;
pub mod miner_tx;
pub mod payment_id;
pub mod tx_construction;
pub mod tx_scanning;

pub use account_keys::AccountKeys;
pub use config::{Config, DonationAccounts};
pub use decompose::DustPolicy;
pub use derivation::Derivation;
pub use emission::{DefaultEmissionCurve, EmissionCurve};
pub use error::{Error, Result};
pub use tx_construction::{
    construct_tx, create_tx, CreateTxArg, CreateTxContext, CreateTxRes, OutputEntry,
    TXDestination, TXSource,
};

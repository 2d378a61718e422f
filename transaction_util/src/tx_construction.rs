//! Module for constructing Cryptonote transactions

use log::{debug, info};
use serde::{Deserialize, Serialize};

use common::{
    absolute_output_offsets_to_relative, Address, GetHash, TXExtra, TXIn, TXInToKey, TXOut,
    Transaction, TransactionPrefix,
};
use crypto::{
    keys::secret_key_to_public_key, ring_signature::generate_ring_signature, KeyImage, KeyPair,
    PublicKey,
};
use ensure_macro::ensure;

use crate::{
    account_keys::AccountKeys,
    config::Config,
    decompose::{split_destinations, DustPolicy},
    derivation::Derivation,
    tx_scanning, Error, Result,
};

/// A ring member: global output index and the output's one-time key
pub type OutputEntry = (u64, PublicKey);

/// Pairs a global output index with its one-time key
pub fn make_output_entry(global_index: u64, key: PublicKey) -> OutputEntry {
    (global_index, key)
}

/// A source entry for a given transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXSource {
    /// Ring members sorted by global output index, the real output among them
    pub outputs: Vec<OutputEntry>,
    /// The position of the real output being spent among `outputs`
    pub real_output: usize,
    /// Public key of the transaction that created the real output
    pub real_out_tx_key: PublicKey,
    /// The position of the real output among the outputs of its transaction
    pub real_output_in_tx_index: u64,
    /// Amount of the real output
    pub amount: u64,
    /// Wallet-side reference to the transfer being spent
    pub transfer_index: u64,
}

/// A destination entry for a given transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXDestination {
    /// Amount being paid to this destination
    pub amount: u64,
    /// Receiving address
    pub address: Address,
}

/// Creates the output paying `amount` to `address`
///
/// The one-time key is H_s(rA || output_index)G + B
pub fn construct_tx_out(
    destination: &TXDestination,
    tx_keypair: &KeyPair,
    output_index: u64,
    mix_attr: u8,
) -> Result<TXOut> {
    let derivation = Derivation::from(&tx_keypair.secret_key, &destination.address.view_public_key)
        .ok_or(Error::KeyDerivation)?;
    let key = tx_scanning::derive_public_key(
        &derivation,
        output_index,
        &destination.address.spend_public_key,
    )?;

    Ok(TXOut::to_key(destination.amount, key, mix_attr))
}

fn sum_amounts<I: Iterator<Item = u64>>(amounts: I) -> Result<u64> {
    amounts.fold(Ok(0u64), |sum, amount| {
        sum?.checked_add(amount).ok_or(Error::MoneyOverflow)
    })
}

/// Constructs a transaction spending the given sources towards the given destinations
///
/// Whatever the sources hold beyond the destinations is left as fee. `extra` is placed
/// before the transaction public key, so padding or unrecognised records in it are rejected.
///
/// # Returns
/// The signed transaction and its one-time keypair
pub fn construct_tx(
    sender_keys: &AccountKeys,
    sources: &[TXSource],
    destinations: &[TXDestination],
    extra: Vec<TXExtra>,
    unlock_time: u64,
    mix_attr: u8,
) -> Result<(Transaction, KeyPair)> {
    ensure!(!sources.is_empty(), Error::NoSources);
    ensure!(!destinations.is_empty(), Error::NoDestinations);
    if let Some(index) = destinations.iter().position(|dst| dst.amount == 0) {
        return Err(Error::ZeroAmountDestination(index));
    }

    let inputs = sum_amounts(sources.iter().map(|src| src.amount))?;
    let outputs = sum_amounts(destinations.iter().map(|dst| dst.amount))?;
    ensure!(outputs <= inputs, Error::InvalidAmount { inputs, outputs });

    ensure!(
        secret_key_to_public_key(&sender_keys.spend_keypair.secret_key)
            == sender_keys.spend_keypair.public_key,
        Error::SpendKeyMismatch
    );

    let tx_keypair = KeyPair::generate();
    let mut prefix = TransactionPrefix::new(unlock_time);
    prefix.extra = extra;
    prefix.add_tx_pub_key_to_extra(tx_keypair.public_key);

    // Recover the one-time secret of every real output
    let mut ephemeral_keys = Vec::with_capacity(sources.len());
    for source in sources {
        let (_, real_key) = source.outputs.get(source.real_output).ok_or(
            Error::RealIndexOutOfBounds {
                index: source.real_output,
                ring_size: source.outputs.len(),
            },
        )?;

        // x = H_s(aR || idx) + b, KI = x * H_p(xG)
        let (ephemeral_keypair, key_image) = tx_scanning::generate_key_image_helper(
            sender_keys,
            &source.real_out_tx_key,
            source.real_output_in_tx_index,
            real_key,
        )?;

        let absolute_offsets: Vec<u64> = source.outputs.iter().map(|(index, _)| *index).collect();
        prefix.inputs.push(TXIn::FromKey(TXInToKey {
            amount: source.amount,
            key_offsets: absolute_output_offsets_to_relative(&absolute_offsets),
            key_image,
        }));
        ephemeral_keys.push(ephemeral_keypair);
    }

    // Output order reveals nothing beyond the amounts themselves
    let mut sorted_destinations = destinations.to_vec();
    sorted_destinations.sort_by_key(|dst| dst.amount);
    for (output_index, destination) in sorted_destinations.iter().enumerate() {
        prefix.outputs.push(construct_tx_out(
            destination,
            &tx_keypair,
            output_index as u64,
            mix_attr,
        )?);
    }

    // Rejects duplicate or unencodable records passed in through `extra`
    prefix.parse_and_validate_tx_extra()?;

    let prefix_hash = prefix.get_hash();
    let mut signatures = Vec::with_capacity(sources.len());
    for ((source, input), ephemeral_keypair) in
        sources.iter().zip(&prefix.inputs).zip(&ephemeral_keys)
    {
        let key_image = &input.as_key_input()?.key_image;
        let ring: Vec<PublicKey> = source.outputs.iter().map(|(_, key)| *key).collect();
        signatures.push(generate_ring_signature(
            &prefix_hash,
            key_image,
            &ring,
            &ephemeral_keypair.secret_key,
            source.real_output,
        )?);
    }

    let tx = Transaction { prefix, signatures };
    info!(
        "Constructed transaction {} ({} inputs, {} outputs, fee {})",
        tx.get_hash(),
        sources.len(),
        destinations.len(),
        inputs - outputs
    );
    debug!("Transaction prefix hash {}", prefix_hash);

    Ok((tx, tx_keypair))
}

/// Everything needed to build a transaction, with destinations already split
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTxArg {
    /// Spend key of the sender, checked against the keys signing the request
    pub spend_pub_key: PublicKey,
    /// Outputs being spent
    pub sources: Vec<TXSource>,
    /// Digit-split destinations, change included
    pub splitted_dsts: Vec<TXDestination>,
    /// Change returned to the sender before splitting
    pub change_amount: u64,
    /// Addresses paid by the request, in the order they were given, change excluded
    pub recipients: Vec<Address>,
    /// Dust split off the change
    pub dust: u64,
    /// Extra records placed in the transaction
    pub extra: Vec<TXExtra>,
    /// Block height or timestamp before which the outputs can't be spent
    pub unlock_time: u64,
    /// Mix attribute given to every output
    pub mix_attr: u8,
}

impl CreateTxArg {
    /// Computes the change owed to `sender_address` and splits every destination
    ///
    /// # Errors
    /// If the destinations and fee spend more than the sources provide
    pub fn new(
        sender_address: Address,
        sources: Vec<TXSource>,
        destinations: &[TXDestination],
        fee: u64,
        dust_policy: &DustPolicy,
        config: &Config,
    ) -> Result<Self> {
        let inputs = sum_amounts(sources.iter().map(|src| src.amount))?;
        let outputs = sum_amounts(destinations.iter().map(|dst| dst.amount))?
            .checked_add(fee)
            .ok_or(Error::MoneyOverflow)?;
        ensure!(outputs <= inputs, Error::InvalidAmount { inputs, outputs });

        let change = TXDestination {
            amount: inputs - outputs,
            address: sender_address,
        };
        let (splitted_dsts, dust) =
            split_destinations(destinations, &change, config.dust_threshold, dust_policy);
        debug!(
            "Split {} destinations into {} outputs, change {} with dust {}",
            destinations.len(),
            splitted_dsts.len(),
            change.amount,
            dust
        );

        Ok(CreateTxArg {
            spend_pub_key: sender_address.spend_public_key,
            sources,
            splitted_dsts,
            change_amount: change.amount,
            recipients: destinations.iter().map(|dst| dst.address).collect(),
            dust,
            extra: Vec::new(),
            unlock_time: 0,
            mix_attr: config.default_mix_attr,
        })
    }
}

/// A constructed transaction along with the data the sender keeps about it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTxRes {
    /// The signed transaction
    pub tx: Transaction,
    /// One-time keypair of the transaction
    pub tx_keypair: KeyPair,
    /// Output indices paying back to the sender with their key images
    pub outs_key_images: Vec<(usize, KeyImage)>,
}

/// Builds and signs the transaction described by `arg`
///
/// # Errors
/// If `sender_keys` don't belong to the account the request was made for, or construction fails
pub fn create_tx(sender_keys: &AccountKeys, arg: &CreateTxArg) -> Result<CreateTxRes> {
    ensure!(
        arg.spend_pub_key == sender_keys.spend_keypair.public_key,
        Error::SpendKeyMismatch
    );

    let (tx, tx_keypair) = construct_tx(
        sender_keys,
        &arg.sources,
        &arg.splitted_dsts,
        arg.extra.clone(),
        arg.unlock_time,
        arg.mix_attr,
    )?;

    // Change outputs can be spent later, so their key images are worth remembering
    let (owned, _) = tx_scanning::lookup_acc_outs(sender_keys, &tx)?;
    let mut outs_key_images = Vec::with_capacity(owned.len());
    for index in owned {
        let key = tx.prefix.outputs[index].target.as_key_output()?.key;
        let (_, key_image) = tx_scanning::generate_key_image_helper(
            sender_keys,
            &tx_keypair.public_key,
            index as u64,
            &key,
        )?;
        outs_key_images.push((index, key_image));
    }

    Ok(CreateTxRes {
        tx,
        tx_keypair,
        outs_key_images,
    })
}

/// A transaction request that can be stored and signed later
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTxContext {
    /// What to build
    pub arg: CreateTxArg,
    /// The result, once signed
    pub res: Option<CreateTxRes>,
}

impl CreateTxContext {
    /// Wraps an unsigned request
    pub fn new(arg: CreateTxArg) -> Self {
        CreateTxContext { arg, res: None }
    }

    /// Builds the transaction, replacing any earlier result
    pub fn sign(&mut self, sender_keys: &AccountKeys) -> Result<&CreateTxRes> {
        let res = create_tx(sender_keys, &self.arg)?;
        Ok(self.res.insert(res))
    }

    /// Serializes the context for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restores a stored context
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

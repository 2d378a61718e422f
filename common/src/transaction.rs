use serde::{Deserialize, Serialize};

use crypto::{keys::check_key, Hash256, KeyImage, PublicKey, Signature};
use ensure_macro::ensure;

use crate::{
    codec::{write_blob, write_varint, DecodeError, DecodeResult, Reader},
    constants::CURRENT_TRANSACTION_VERSION,
    extra::{decode_extra, encode_extra},
    Decode, Encode, Error, GetHash, Result, TXExtra,
};

const TAG_GEN: u8 = 0xff;
const TAG_SCRIPT: u8 = 0x00;
const TAG_SCRIPT_HASH: u8 = 0x01;
const TAG_KEY: u8 = 0x02;

/// Output target spendable by a script
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXOutToScript {
    pub keys: Vec<PublicKey>,
    pub script: Vec<u8>,
}

/// Spend of an existing "ToKey" output through a ring of decoys
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXInToKey {
    /// Amount of the spent output (all ring members share it)
    pub amount: u64,
    /// Relative offsets of each output in the ring
    pub key_offsets: Vec<u64>,
    /// Key image of the sender's output
    pub key_image: KeyImage,
}

/// Transaction input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TXIn {
    /// Coinbase input. Creates new coins
    /// Contains the Block height of this transaction
    Gen(u64),
    FromScript {
        prev: Hash256,
        prevout: u64,
        sigset: Vec<u8>,
    },
    FromScriptHash {
        prev: Hash256,
        prevout: u64,
        script: TXOutToScript,
        sigset: Vec<u8>,
    },
    /// Coins from an existing "ToKey" output
    FromKey(TXInToKey),
}

/// Plain one-time key output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXOutToKey {
    /// Target public key
    pub key: PublicKey,
    /// Mixing attribute, see `is_mixattr_applicable_for_fake_outs_counter`
    pub mix_attr: u8,
}

/// Transaction output target
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TXOutTarget {
    ToScript(TXOutToScript),
    ToScriptHash(Hash256),
    /// Send to specified public key
    ToKey(TXOutToKey),
}

/// Transaction output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXOut {
    /// Amount of coins received
    pub amount: u64,
    /// Transaction output target
    pub target: TXOutTarget,
}

/// Transaction prefix
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPrefix {
    /// This transaction's version
    pub version: u64,
    /// Block height (or timestamp) until which the outputs can't be spent
    pub unlock_time: u64,
    /// List of inputs to this transaction
    pub inputs: Vec<TXIn>,
    /// List of outputs in this transaction
    pub outputs: Vec<TXOut>,
    /// Extra information tagged to this transaction
    pub extra: Vec<TXExtra>,
}

/// A complete Transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// This transaction's prefix
    pub prefix: TransactionPrefix,
    /// One set of ring signatures per input, empty for non-key inputs
    pub signatures: Vec<Vec<Signature>>,
}

/// Mix attribute: the output may be mixed freely
pub const MIX_ATTR_NO_MIX_LIMIT: u8 = 0;
/// Mix attribute: the output may only be spent without decoys
pub const MIX_ATTR_NO_MIX: u8 = 1;

impl TXIn {
    /// Human readable variant name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TXIn::Gen(_) => "gen",
            TXIn::FromScript { .. } => "script",
            TXIn::FromScriptHash { .. } => "script hash",
            TXIn::FromKey(_) => "key",
        }
    }

    pub fn as_key_input(&self) -> Result<&TXInToKey> {
        match self {
            TXIn::FromKey(input) => Ok(input),
            other => Err(Error::UnexpectedInputType {
                expected: "key",
                found: other.kind(),
            }),
        }
    }

    /// Number of ring signatures this input carries
    pub fn signature_count(&self) -> usize {
        match self {
            TXIn::FromKey(input) => input.key_offsets.len(),
            _ => 0,
        }
    }
}

impl TXOutTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            TXOutTarget::ToScript(_) => "script",
            TXOutTarget::ToScriptHash(_) => "script hash",
            TXOutTarget::ToKey(_) => "key",
        }
    }

    pub fn as_key_output(&self) -> Result<&TXOutToKey> {
        match self {
            TXOutTarget::ToKey(output) => Ok(output),
            other => Err(Error::UnexpectedOutputType {
                expected: "key",
                found: other.kind(),
            }),
        }
    }
}

impl TXOut {
    pub fn to_key(amount: u64, key: PublicKey, mix_attr: u8) -> Self {
        TXOut {
            amount,
            target: TXOutTarget::ToKey(TXOutToKey { key, mix_attr }),
        }
    }
}

impl TransactionPrefix {
    /// Creates an empty prefix at the current transaction version
    pub fn new(unlock_time: u64) -> Self {
        TransactionPrefix {
            version: CURRENT_TRANSACTION_VERSION,
            unlock_time,
            inputs: Vec::new(),
            outputs: Vec::new(),
            extra: Vec::new(),
        }
    }
}

impl Transaction {
    /// Wraps a prefix with one empty signature set per input
    pub fn unsigned(prefix: TransactionPrefix) -> Self {
        let signatures = vec![Vec::new(); prefix.inputs.len()];
        Transaction { prefix, signatures }
    }

    /// Decodes a transaction blob
    ///
    /// # Returns
    /// The transaction along with its hash and prefix hash
    pub fn parse_and_validate(blob: &[u8]) -> Result<(Self, Hash256, Hash256)> {
        let tx = Transaction::from_blob(blob)?;
        let tx_hash = tx.get_hash();
        let prefix_hash = tx.prefix.get_hash();
        Ok((tx, tx_hash, prefix_hash))
    }

    pub fn prefix_hash(&self) -> Hash256 {
        self.prefix.get_hash()
    }

    /// Size of the canonical blob in bytes
    pub fn blob_size(&self) -> usize {
        self.to_blob().len()
    }

    /// First 8 hex characters of the transaction hash followed by "...."
    pub fn short_hash_str(&self) -> String {
        let mut res = self.get_hash().to_string();
        res.truncate(8);
        res.push_str("....");
        res
    }

    pub fn is_coinbase(&self) -> bool {
        match self.prefix.inputs.as_slice() {
            [TXIn::Gen(_)] => true,
            _ => false,
        }
    }

    /// Sums the amounts of all key inputs
    ///
    /// # Errors
    /// If an input isn't a key input or the sum overflows
    pub fn inputs_money_amount(&self) -> Result<u64> {
        self.prefix.inputs.iter().try_fold(0u64, |sum, input| {
            let input = input.as_key_input()?;
            sum.checked_add(input.amount).ok_or(Error::MoneyOverflow)
        })
    }

    pub fn outs_money_amount(&self) -> Result<u64> {
        self.prefix
            .outputs
            .iter()
            .try_fold(0u64, |sum, output| sum.checked_add(output.amount))
            .ok_or(Error::MoneyOverflow)
    }

    /// Inputs minus outputs. Coinbase transactions carry no fee
    pub fn fee(&self) -> Result<u64> {
        if self.is_coinbase() {
            return Ok(0);
        }
        let inputs = self.inputs_money_amount()?;
        let outputs = self.outs_money_amount()?;
        inputs
            .checked_sub(outputs)
            .ok_or(Error::NegativeFee { inputs, outputs })
    }

    /// Reward claimed by a miner transaction
    pub fn reward_from_miner_tx(&self) -> Result<u64> {
        self.outs_money_amount()
    }

    /// Ensures every input is a key input
    pub fn check_inputs_types_supported(&self) -> Result<()> {
        for (index, input) in self.prefix.inputs.iter().enumerate() {
            ensure!(input.as_key_input().is_ok(), Error::UnsupportedInput(index));
        }
        Ok(())
    }

    /// Ensures every output is a non-zero key output with a valid key
    pub fn check_outs_valid(&self) -> Result<()> {
        for (index, output) in self.prefix.outputs.iter().enumerate() {
            let target = output.target.as_key_output().map_err(|_| Error::InvalidOutput {
                index,
                reason: "not a key output",
            })?;
            ensure!(
                output.amount > 0,
                Error::InvalidOutput {
                    index,
                    reason: "zero amount",
                }
            );
            ensure!(
                check_key(&target.key),
                Error::InvalidOutput {
                    index,
                    reason: "invalid public key",
                }
            );
        }
        Ok(())
    }

    /// Ensures neither the input nor the output amounts overflow when summed
    pub fn check_money_overflow(&self) -> Result<()> {
        if !self.is_coinbase() {
            self.inputs_money_amount()?;
        }
        self.outs_money_amount()?;
        Ok(())
    }
}

/// Checks whether an output with the given mix attribute can be used in a ring with
/// `fake_outputs_count` decoys
pub fn is_mixattr_applicable_for_fake_outs_counter(mix_attr: u8, fake_outputs_count: u64) -> bool {
    match mix_attr {
        MIX_ATTR_NO_MIX_LIMIT => true,
        MIX_ATTR_NO_MIX => fake_outputs_count == 0,
        // The attribute is the minimum ring size, at least 2 here
        min_ring_size => fake_outputs_count >= u64::from(min_ring_size) - 1,
    }
}

/// Converts absolute global output indices to offsets relative to the previous index
///
/// The indices must be sorted in ascending order
pub fn absolute_output_offsets_to_relative(offsets: &[u64]) -> Vec<u64> {
    let mut previous = 0;
    offsets
        .iter()
        .map(|&offset| {
            let relative = offset.wrapping_sub(previous);
            previous = offset;
            relative
        })
        .collect()
}

/// Converts relative output offsets back into absolute global output indices
pub fn relative_output_offsets_to_absolute(offsets: &[u64]) -> Vec<u64> {
    let mut sum = 0u64;
    offsets
        .iter()
        .map(|&offset| {
            sum = sum.wrapping_add(offset);
            sum
        })
        .collect()
}

impl Encode for TXOutToScript {
    fn encode(&self, out: &mut Vec<u8>) {
        self.keys.encode(out);
        write_blob(out, &self.script);
    }
}

impl Decode for TXOutToScript {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(TXOutToScript {
            keys: Vec::decode(reader)?,
            script: reader.read_blob()?,
        })
    }
}

impl Encode for TXIn {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            TXIn::Gen(height) => {
                out.push(TAG_GEN);
                write_varint(out, *height);
            }
            TXIn::FromScript {
                prev,
                prevout,
                sigset,
            } => {
                out.push(TAG_SCRIPT);
                prev.encode(out);
                write_varint(out, *prevout);
                write_blob(out, sigset);
            }
            TXIn::FromScriptHash {
                prev,
                prevout,
                script,
                sigset,
            } => {
                out.push(TAG_SCRIPT_HASH);
                prev.encode(out);
                write_varint(out, *prevout);
                script.encode(out);
                write_blob(out, sigset);
            }
            TXIn::FromKey(input) => {
                out.push(TAG_KEY);
                write_varint(out, input.amount);
                write_varint(out, input.key_offsets.len() as u64);
                for offset in &input.key_offsets {
                    write_varint(out, *offset);
                }
                input.key_image.encode(out);
            }
        }
    }
}

impl Decode for TXIn {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        match reader.read_u8()? {
            TAG_GEN => Ok(TXIn::Gen(reader.read_varint()?)),
            TAG_SCRIPT => Ok(TXIn::FromScript {
                prev: Hash256::decode(reader)?,
                prevout: reader.read_varint()?,
                sigset: reader.read_blob()?,
            }),
            TAG_SCRIPT_HASH => Ok(TXIn::FromScriptHash {
                prev: Hash256::decode(reader)?,
                prevout: reader.read_varint()?,
                script: TXOutToScript::decode(reader)?,
                sigset: reader.read_blob()?,
            }),
            TAG_KEY => {
                let amount = reader.read_varint()?;
                let count = reader.read_length(1)?;
                let key_offsets = (0..count)
                    .map(|_| reader.read_varint())
                    .collect::<DecodeResult<_>>()?;
                Ok(TXIn::FromKey(TXInToKey {
                    amount,
                    key_offsets,
                    key_image: KeyImage::decode(reader)?,
                }))
            }
            tag => Err(DecodeError::UnknownTag { kind: "input", tag }),
        }
    }
}

impl Encode for TXOut {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.amount);
        match &self.target {
            TXOutTarget::ToScript(target) => {
                out.push(TAG_SCRIPT);
                target.encode(out);
            }
            TXOutTarget::ToScriptHash(hash) => {
                out.push(TAG_SCRIPT_HASH);
                hash.encode(out);
            }
            TXOutTarget::ToKey(target) => {
                out.push(TAG_KEY);
                target.key.encode(out);
                out.push(target.mix_attr);
            }
        }
    }
}

impl Decode for TXOut {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let amount = reader.read_varint()?;
        let target = match reader.read_u8()? {
            TAG_SCRIPT => TXOutTarget::ToScript(TXOutToScript::decode(reader)?),
            TAG_SCRIPT_HASH => TXOutTarget::ToScriptHash(Hash256::decode(reader)?),
            TAG_KEY => TXOutTarget::ToKey(TXOutToKey {
                key: PublicKey::decode(reader)?,
                mix_attr: reader.read_u8()?,
            }),
            tag => return Err(DecodeError::UnknownTag { kind: "output", tag }),
        };
        Ok(TXOut { amount, target })
    }
}

impl Encode for TransactionPrefix {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.version);
        write_varint(out, self.unlock_time);
        self.inputs.encode(out);
        self.outputs.encode(out);

        let mut extra = Vec::new();
        encode_extra(&self.extra, &mut extra);
        write_blob(out, &extra);
    }
}

impl Decode for TransactionPrefix {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let version = reader.read_varint()?;
        ensure!(
            version != 0 && version <= CURRENT_TRANSACTION_VERSION,
            DecodeError::UnsupportedVersion(version)
        );
        Ok(TransactionPrefix {
            version,
            unlock_time: reader.read_varint()?,
            inputs: Vec::decode(reader)?,
            outputs: Vec::decode(reader)?,
            extra: decode_extra(&reader.read_blob()?),
        })
    }
}

/// The prefix followed by every input's signatures, without any counts. The number of
/// signatures of an input is implied by its ring size
impl Encode for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        self.prefix.encode(out);
        for signature in self.signatures.iter().flatten() {
            signature.encode(out);
        }
    }
}

impl Decode for Transaction {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let prefix = TransactionPrefix::decode(reader)?;
        let mut signatures = Vec::with_capacity(prefix.inputs.len());
        for input in &prefix.inputs {
            let count = input.signature_count();
            ensure!(
                count <= reader.remaining() / 64,
                DecodeError::LengthTooLarge(count as u64)
            );
            signatures.push(
                (0..count)
                    .map(|_| Signature::decode(reader))
                    .collect::<DecodeResult<_>>()?,
            );
        }
        Ok(Transaction { prefix, signatures })
    }
}

impl GetHash for TransactionPrefix {
    fn get_hash_blob(&self) -> Vec<u8> {
        self.to_blob()
    }
}

impl GetHash for Transaction {
    fn get_hash_blob(&self) -> Vec<u8> {
        self.to_blob()
    }
}

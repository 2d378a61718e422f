use log::debug;
use serde::{Deserialize, Serialize};

use crypto::{tree_hash::tree_hash, Hash256};
use ensure_macro::ensure;

use crate::{
    codec::{write_varint, DecodeError, DecodeResult, Reader},
    constants::{CURRENT_BLOCK_MAJOR_VERSION, CURRENT_BLOCK_MINOR_VERSION, GENESIS_NONCE},
    Decode, Encode, Error, GetHash, Result, TXIn, Transaction,
};

/// Coinbase transaction of the genesis block
///
/// Pays 2^44 - 1 atomic units over 9 outputs, unlocked after the mined money window
const GENESIS_COINBASE_TX_HEX: &str = "010a01ff0009ffda0202e7caaa83373a94afae43fec59b447c99ba282b19a7616c24c785ad8966a1e10e00809bee0202e6050df522ee2d93ab024997bee05d000a4c6dcf2f3acb8c6cc79499ed9422db0080e892260278021b25eb446235a4af5246fa0f72589a72c7d78f77da0bb35c8cefd541819a0080c2d72f020e40848715696e4a7483a9320ee48ec06c80ca946c1148b966e76337cd95bc170080a8d6b90702a6c0381cc655b64838b4b8b4f60b6f074a0ab8ffc7721699704bfd077262d1f3008088aca3cf020290fd82620079591503dac1a64af2233f4da513e13246ef93d146ba4b53b25c2d008090cad2c60e0296174c8b398b207a187b9396d069587e6041de1fb641d5653b6acc0c9ba90e6f0080e08d84ddcb0102db1a6aa89e7ee7428bd03b57bb5ebb654f7637a9949a2b1c9dddf8c73bea5aae0080c0caf384a30202f10367b0afc6a352860626af9107651d7b392d5b07e571c437778caaedd3d970002101d26703e41c1ce4a720da2fb853c13b7d568a3f93c4a41df55554e59be395291b";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub prev_id: Hash256,
    pub nonce: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub miner_tx: Transaction,
    pub tx_hashes: Vec<Hash256>,
}

/// Merkle root of the miner transaction hash followed by the other transaction hashes
pub fn get_tx_tree_hash(miner_tx_hash: Hash256, tx_hashes: &[Hash256]) -> Hash256 {
    let mut hashes = Vec::with_capacity(tx_hashes.len() + 1);
    hashes.push(miner_tx_hash);
    hashes.extend_from_slice(tx_hashes);
    tree_hash(&hashes)
}

impl BlockHeader {
    pub fn new(timestamp: u64, prev_id: Hash256, nonce: u64) -> Self {
        BlockHeader {
            major_version: CURRENT_BLOCK_MAJOR_VERSION,
            minor_version: CURRENT_BLOCK_MINOR_VERSION,
            timestamp,
            prev_id,
            nonce,
        }
    }
}

impl Block {
    /// Builds the genesis block. Calling this repeatedly always gives the same block
    pub fn genesis() -> Result<Self> {
        let blob = hex::decode(GENESIS_COINBASE_TX_HEX).map_err(|_| Error::InvalidHex)?;
        let miner_tx = Transaction::from_blob(&blob)?;
        Ok(Block {
            header: BlockHeader::new(0, Hash256::null_hash(), GENESIS_NONCE),
            miner_tx,
            tx_hashes: Vec::new(),
        })
    }

    /// Decodes a block blob, requiring a well formed miner transaction
    pub fn parse_and_validate(blob: &[u8]) -> Result<Self> {
        let block = Block::from_blob(blob).map_err(|err| {
            debug!("Rejected block blob of {} bytes: {}", blob.len(), err);
            err
        })?;
        block.height()?;
        Ok(block)
    }

    /// Height recorded in the generation input of the miner transaction
    pub fn height(&self) -> Result<u64> {
        match self.miner_tx.prefix.inputs.as_slice() {
            [TXIn::Gen(height)] => Ok(*height),
            _ => Err(Error::InvalidMinerTx),
        }
    }

    pub fn tx_tree_hash(&self) -> Hash256 {
        get_tx_tree_hash(self.miner_tx.get_hash(), &self.tx_hashes)
    }

    /// The bytes committed to by the block ID and the proof of work
    pub fn hashing_blob(&self) -> Vec<u8> {
        let mut blob = self.header.to_blob();
        blob.extend_from_slice(self.tx_tree_hash().as_bytes());
        write_varint(&mut blob, self.tx_hashes.len() as u64 + 1);
        blob
    }
}

impl Encode for BlockHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, u64::from(self.major_version));
        write_varint(out, u64::from(self.minor_version));
        write_varint(out, self.timestamp);
        self.prev_id.encode(out);
        out.extend_from_slice(&self.nonce.to_le_bytes());
    }
}

impl Decode for BlockHeader {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let major_version = reader.read_varint_u8()?;
        ensure!(
            major_version <= CURRENT_BLOCK_MAJOR_VERSION,
            DecodeError::UnsupportedVersion(u64::from(major_version))
        );
        Ok(BlockHeader {
            major_version,
            minor_version: reader.read_varint_u8()?,
            timestamp: reader.read_varint()?,
            prev_id: Hash256::decode(reader)?,
            nonce: reader.read_u64_le()?,
        })
    }
}

impl Encode for Block {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        self.miner_tx.encode(out);
        self.tx_hashes.encode(out);
    }
}

impl Decode for Block {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(Block {
            header: BlockHeader::decode(reader)?,
            miner_tx: Transaction::decode(reader)?,
            tx_hashes: Vec::decode(reader)?,
        })
    }
}

/// The block ID is the hash of the length prefixed hashing blob
impl GetHash for Block {
    fn get_hash_blob(&self) -> Vec<u8> {
        let hashing_blob = self.hashing_blob();
        let mut blob = varint::serialize(hashing_blob.len() as u64);
        blob.extend_from_slice(&hashing_blob);
        blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{TXExtra, TXOutTarget};

    #[test]
    fn it_builds_the_genesis_block() {
        let genesis = Block::genesis().unwrap();

        assert_eq!(genesis, Block::genesis().unwrap());
        assert_eq!(genesis.height(), Ok(0));
        assert_eq!(genesis.header.nonce, GENESIS_NONCE);
        assert!(genesis.header.prev_id.is_null());
        assert_eq!(genesis.miner_tx.prefix.unlock_time, 10);
        assert_eq!(genesis.miner_tx.signatures, vec![vec![]]);
        assert_eq!(genesis.miner_tx.outs_money_amount(), Ok((1 << 44) - 1));
        assert_eq!(genesis.miner_tx.prefix.outputs.len(), 9);
        assert!(genesis
            .miner_tx
            .prefix
            .outputs
            .iter()
            .all(|out| match out.target {
                TXOutTarget::ToKey(target) => target.mix_attr == 0,
                _ => false,
            }));
        assert!(match genesis.miner_tx.prefix.extra.as_slice() {
            [TXExtra::TxPublicKey(_)] => true,
            _ => false,
        });
        assert_eq!(
            hex::encode(genesis.miner_tx.to_blob()),
            GENESIS_COINBASE_TX_HEX
        );
    }

    #[test]
    fn it_hashes_the_genesis_block() {
        let genesis = Block::genesis().unwrap();

        assert_eq!(
            genesis.miner_tx.get_hash().to_string(),
            "38e2c0854e63eaa8e10fd04099ca7c1a122b3015c0dc97017eb3e738a061f4f5"
        );
        assert_eq!(
            hex::encode(genesis.hashing_blob()),
            "0100000000000000000000000000000000000000000000000000000000000000000000b54a05060000000038e2c0854e63eaa8e10fd04099ca7c1a122b3015c0dc97017eb3e738a061f4f501"
        );
        assert_eq!(
            genesis.get_hash().to_string(),
            "7fadb3c19b09ad5f70fbae5ee47dbc1885fb22191803b2a6acc0d9b5399906fc"
        );
    }

    #[test]
    fn it_round_trips_blocks() {
        let mut block = Block::genesis().unwrap();
        block.header.timestamp = 1_400_000_000;
        block.tx_hashes = vec![crypto::cn_fast_hash(b"a"), crypto::cn_fast_hash(b"b")];

        let blob = block.to_blob();
        assert_eq!(Block::parse_and_validate(&blob), Ok(block.clone()));

        // Three leaves in the tree, three recorded in the hashing blob
        let hashing_blob = block.hashing_blob();
        assert_eq!(hashing_blob[hashing_blob.len() - 1], 3);
        assert_eq!(
            &hashing_blob[hashing_blob.len() - 33..hashing_blob.len() - 1],
            block.tx_tree_hash().as_bytes()
        );
    }

    #[test]
    fn it_rejects_malformed_blocks() {
        let block = Block::genesis().unwrap();
        let blob = block.to_blob();

        assert!(Block::parse_and_validate(&blob[..blob.len() - 1]).is_err());

        let mut future = blob.clone();
        future[0] = 2;
        assert_eq!(
            Block::parse_and_validate(&future),
            Err(Error::Decode(DecodeError::UnsupportedVersion(2)))
        );

        let mut coinless = block;
        coinless.miner_tx.prefix.inputs.clear();
        coinless.miner_tx.signatures.clear();
        assert_eq!(
            Block::parse_and_validate(&coinless.to_blob()),
            Err(Error::InvalidMinerTx)
        );
    }
}

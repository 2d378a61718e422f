//! Proof-of-work long hash
//!
//! The block hashing blob is run through the double multiplicative Wild-Keccak. Before each
//! round the current state picks scratchpad entries whose words are mixed into the state,
//! tying the hash to the whole scratchpad.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};

use crypto::{
    wild_keccak::{wild_keccak_dbl, KeccakState, Mixin, MulTheta},
    Hash256,
};
use ensure_macro::ensure;

use crate::{Block, Error, Result};

/// Groups of state words selecting scratchpad entries
const MIX_GROUPS: usize = 6;
/// Scratchpad entries XORed together per group
const ENTRIES_PER_GROUP: usize = 4;

/// Read access to a scratchpad
///
/// Implementations must be deterministic and must map every index to some entry
pub trait ScratchpadAccess {
    fn entry(&self, index: u64) -> Hash256;
}

impl<F> ScratchpadAccess for F
where
    F: Fn(u64) -> Hash256,
{
    fn entry(&self, index: u64) -> Hash256 {
        self(index)
    }
}

/// Scratchpad held in memory, indexed modulo its length
pub struct Scratchpad<'a>(pub &'a [Hash256]);

impl ScratchpadAccess for Scratchpad<'_> {
    fn entry(&self, index: u64) -> Hash256 {
        if self.0.is_empty() {
            return Hash256::null_hash();
        }
        self.0[(index % self.0.len() as u64) as usize]
    }
}

fn fill_mixin<A: ScratchpadAccess + ?Sized>(st: &KeccakState, mixin: &mut Mixin, scratchpad: &A) {
    for group in 0..MIX_GROUPS {
        let mut acc = [0u64; 4];
        for selector in &st[group * ENTRIES_PER_GROUP..(group + 1) * ENTRIES_PER_GROUP] {
            let entry = scratchpad.entry(*selector);
            for (word, chunk) in acc.iter_mut().zip(entry.as_bytes().chunks_exact(8)) {
                *word ^= LittleEndian::read_u64(chunk);
            }
        }
        mixin[group * 4..group * 4 + 4].copy_from_slice(&acc);
    }
}

/// Long hash of an arbitrary blob. At height 0 the scratchpad isn't consulted
pub fn get_blob_longhash<A: ScratchpadAccess + ?Sized>(
    blob: &[u8],
    height: u64,
    scratchpad: &A,
) -> Hash256 {
    wild_keccak_dbl::<MulTheta, _>(blob, &mut |st: &KeccakState, mixin: &mut Mixin| {
        if height == 0 {
            *mixin = [0; 24];
        } else {
            fill_mixin(st, mixin, scratchpad);
        }
    })
}

/// Long hash of a block's hashing blob, compared against the difficulty target
pub fn get_block_longhash<A: ScratchpadAccess + ?Sized>(
    block: &Block,
    height: u64,
    scratchpad: &A,
) -> Hash256 {
    get_blob_longhash(&block.hashing_blob(), height, scratchpad)
}

/// Writes one `index: hash` line per scratchpad entry
pub fn dump_scratchpad<W: Write>(scratchpad: &[Hash256], mut out: W) -> std::io::Result<()> {
    for (index, entry) in scratchpad.iter().enumerate() {
        writeln!(out, "{}: {}", index, entry)?;
    }
    Ok(())
}

/// Hex form of a scratchpad addendum, entries concatenated
pub fn addendum_to_hexstr(addendum: &[Hash256]) -> String {
    addendum.iter().map(Hash256::to_string).collect()
}

pub fn hexstr_to_addendum(hex_str: &str) -> Result<Vec<Hash256>> {
    ensure!(hex_str.len() % 64 == 0, Error::InvalidHex);
    let bytes = hex::decode(hex_str).map_err(|_| Error::InvalidHex)?;
    Ok(bytes
        .chunks_exact(32)
        .map(|chunk| {
            let mut entry = [0; 32];
            entry.copy_from_slice(chunk);
            Hash256::from_bytes(entry)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crypto::cn_fast_hash;

    fn scratchpad(len: u8) -> Vec<Hash256> {
        (0..len).map(|i| cn_fast_hash(&[i])).collect()
    }

    #[test]
    fn it_ignores_the_scratchpad_at_height_zero() {
        let block = Block::genesis().unwrap();
        let empty: &[Hash256] = &[];

        let hash = get_block_longhash(&block, 0, &Scratchpad(empty));
        assert_eq!(hash, get_block_longhash(&block, 0, &Scratchpad(&scratchpad(5))));
        assert_eq!(
            hash.to_string(),
            "26a1ea9dfde718517c971faf428764aa8b5644234e1018fefd1e7ebe1394780d"
        );
    }

    #[test]
    fn it_mixes_in_scratchpad_entries() {
        let block = Block::genesis().unwrap();
        let pad = scratchpad(5);

        let hash = get_block_longhash(&block, 1, &Scratchpad(&pad));
        assert_eq!(
            hash.to_string(),
            "7777a9bb032882fbe2c0cd0aa443df4e83b9f7a79824eace7f126f6d7af37185"
        );

        // A closure accessor over the same entries agrees
        let accessor = |index: u64| pad[(index % 5) as usize];
        assert_eq!(get_block_longhash(&block, 1, &accessor), hash);

        for i in 0..pad.len() {
            let mut altered = pad.clone();
            altered[i] = cn_fast_hash(b"altered");
            assert_ne!(get_block_longhash(&block, 1, &Scratchpad(&altered)), hash);
        }
    }

    #[test]
    fn it_converts_addendums() {
        let addendum = scratchpad(3);
        let hex_str = addendum_to_hexstr(&addendum);
        assert_eq!(hex_str.len(), 3 * 64);
        assert_eq!(hexstr_to_addendum(&hex_str), Ok(addendum));
        assert_eq!(hexstr_to_addendum("abc"), Err(Error::InvalidHex));
        assert_eq!(hexstr_to_addendum(&"zz".repeat(32)), Err(Error::InvalidHex));
        assert_eq!(hexstr_to_addendum(""), Ok(vec![]));
    }

    #[test]
    fn it_dumps_scratchpads() {
        let mut out = Vec::new();
        dump_scratchpad(&scratchpad(2), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with(&format!("0: {}\n", cn_fast_hash(&[0]))));
    }
}

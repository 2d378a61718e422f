use std::convert::{From, TryFrom};
use std::fmt::{Display, Formatter};

use digest::Digest;
use serde::{Deserialize, Serialize};
use sha3::Keccak256;

pub type Hash256Data = generic_array::GenericArray<u8, generic_array::typenum::U32>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Hash256(Hash256Data);

impl Hash256 {
    pub fn null_hash() -> Self {
        Hash256::from(Hash256Data::from([0; 32]))
    }
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256::from(Hash256Data::from(bytes))
    }
    pub fn data(&self) -> &Hash256Data {
        &self.0
    }
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0; 32];
        bytes.copy_from_slice(&self.0);
        bytes
    }
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }
}

impl Display for Hash256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<Hash256Data> for Hash256 {
    fn from(data: Hash256Data) -> Self {
        Hash256(data)
    }
}

impl TryFrom<&str> for Hash256 {
    type Error = hex::FromHexError;
    fn try_from(data: &str) -> Result<Self, Self::Error> {
        if data.len() != 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Hash256(Hash256Data::clone_from_slice(&hex::decode(data)?)))
    }
}

/// Incremental form of the CryptoNote fast hash (Keccak-256 with the original padding)
#[derive(Clone, Default)]
pub struct CNFastHash {
    hasher: Keccak256,
}

impl CNFastHash {
    pub fn new() -> Self {
        CNFastHash::default()
    }
    pub fn input<B: AsRef<[u8]>>(&mut self, data: B) {
        self.hasher.input(data);
    }
    pub fn chain<B: AsRef<[u8]>>(mut self, data: B) -> Self {
        self.input(data);
        self
    }
    pub fn result(self) -> Hash256 {
        Hash256(self.hasher.result())
    }
}

/// Hashes the given blob with the CryptoNote fast hash
pub fn cn_fast_hash(data: &[u8]) -> Hash256 {
    Hash256(Keccak256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_hash() {
        assert_eq!(
            Hash256::null_hash().to_string(),
            "0000000000000000000000000000000000000000000000000000000000000000"
        );
        assert!(Hash256::null_hash().is_null());
    }

    #[test]
    fn decodes_correctly() {
        let data: [u8; 32] = [
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
            24, 25, 26, 27, 28, 29, 30, 31, 32,
        ];
        let hash =
            Hash256::try_from("0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20")
                .unwrap();
        assert_eq!(hash.data().as_slice(), data);
        assert_eq!(hash, Hash256::from_bytes(data));
    }

    #[test]
    fn errors_on_invalid_input() {
        assert!(Hash256::try_from("01").is_err());
        assert!(Hash256::try_from(
            "zz02030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
        )
        .is_err());
    }

    #[test]
    fn fast_hash_matches_keccak_vectors() {
        assert_eq!(
            cn_fast_hash(b"").to_string(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        let incremental = CNFastHash::new().chain(b"de omnibus ").chain(b"dubitandum").result();
        assert_eq!(incremental, cn_fast_hash(b"de omnibus dubitandum"));
    }
}

//! Module for handling addresses

use serde::{Deserialize, Serialize};

use crypto::{keys::check_key, PublicKey};

use crate::{
    codec::{DecodeResult, Reader},
    Decode, Encode,
};

/// Prefixes used to identify an address from its string representation
pub trait AddressPrefixes {
    /// Prefix for a standard address
    const STANDARD: u64;
}

/// Address prefixes of the main network
pub struct MainNet;

impl AddressPrefixes for MainNet {
    const STANDARD: u64 = crate::constants::PUBLIC_ADDRESS_BASE58_PREFIX;
}

/// Error type for Address operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Returned when the address isn't valid base58 or fails its checksum
    #[error("Invalid address encoding")]
    InvalidEncoding,

    /// Returned when the address prefix is invalid
    #[error("Invalid address prefix {0:#x}")]
    InvalidPrefix(u64),

    /// Returned when the decoded payload isn't a prefix followed by two keys
    #[error("Invalid address length")]
    InvalidLength,
}

/// Wrapper for the set of public keys in an address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Public spend key
    pub spend_public_key: PublicKey,
    /// Public view key
    pub view_public_key: PublicKey,
}

impl Address {
    pub fn standard(spend_public_key: PublicKey, view_public_key: PublicKey) -> Self {
        Address {
            spend_public_key,
            view_public_key,
        }
    }

    /// Whether both keys are valid curve points
    pub fn is_valid(&self) -> bool {
        check_key(&self.spend_public_key) && check_key(&self.view_public_key)
    }

    /// Converts a human readable Cryptonote address into an Address
    pub fn from_address_string<TPrefix: AddressPrefixes>(data: &str) -> Result<Self, AddressError> {
        let data = base58_monero::decode_check(data).map_err(|_| AddressError::InvalidEncoding)?;

        let (tag, tag_end) =
            varint::deserialize(&data).map_err(|_| AddressError::InvalidEncoding)?;
        if tag != TPrefix::STANDARD {
            return Err(AddressError::InvalidPrefix(tag));
        }

        Address::from_blob(&data[tag_end..]).map_err(|_| AddressError::InvalidLength)
    }

    /// Converts an Address to a human readable Cryptonote address
    pub fn to_address_string<TPrefix: AddressPrefixes>(&self) -> Result<String, AddressError> {
        let mut address = varint::serialize(TPrefix::STANDARD);
        self.encode(&mut address);

        base58_monero::encode_check(&address).map_err(|_| AddressError::InvalidEncoding)
    }
}

/// Spend key followed by view key
impl Encode for Address {
    fn encode(&self, out: &mut Vec<u8>) {
        self.spend_public_key.encode(out);
        self.view_public_key.encode(out);
    }
}

impl Decode for Address {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(Address {
            spend_public_key: PublicKey::decode(reader)?,
            view_public_key: PublicKey::decode(reader)?,
        })
    }
}

//! Tagged records of the transaction extra field
//!
//! Decoding is total: the first record that is unknown or doesn't parse swallows the rest of
//! the field as `TXExtra::Unknown`, so re-encoding always yields the original bytes.

use log::debug;
use serde::{Deserialize, Serialize};

use crypto::PublicKey;
use ensure_macro::ensure;

use crate::{
    codec::{DecodeResult, Reader},
    AliasInfo, Decode, Encode, Error, Result, TransactionPrefix,
};

pub const TX_EXTRA_TAG_PADDING: u8 = 0x00;
pub const TX_EXTRA_TAG_PUBKEY: u8 = 0x01;
pub const TX_EXTRA_TAG_USER_DATA: u8 = 0x02;
pub const TX_EXTRA_TAG_ALIAS: u8 = 0x03;
pub const TX_EXTRA_TAG_NONCE: u8 = 0x04;

/// Sub-record tags inside a user data blob
pub const USER_DATA_TAG_PAYMENT_ID: u8 = 0x01;
pub const USER_DATA_TAG_SWAP_ADDRESS: u8 = 0x02;

/// Size of an encrypted swap address record
pub const SWAP_ADDRESS_SIZE: usize = 64;

/// Extra information added to the transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TXExtra {
    /// Run of zero bytes up to the end of the field, tag included in the count
    Padding(usize),
    /// Public key of this transaction (for determining output secret keys)
    TxPublicKey(PublicKey),
    /// Opaque payload of at most 255 bytes, see `make_user_data`
    UserData(Vec<u8>),
    /// Alias registration or update
    Alias(AliasInfo),
    /// Arbitrary bytes, at most 255 of them. Miners use it for extra nonce space
    Nonce(Vec<u8>),
    /// Everything from an unrecognised or malformed record to the end of the field
    Unknown { tag: u8, data: Vec<u8> },
}

/// Decoded contents of a transaction's extra field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxExtraInfo {
    pub tx_pub_key: Option<PublicKey>,
    pub alias: Option<AliasInfo>,
    pub user_data: Option<Vec<u8>>,
}

fn write_short_blob(out: &mut Vec<u8>, tag: u8, data: &[u8]) {
    out.push(tag);
    out.push(data.len() as u8);
    out.extend_from_slice(data);
}

pub fn encode_extra(fields: &[TXExtra], out: &mut Vec<u8>) {
    for field in fields {
        match field {
            TXExtra::Padding(size) => out.resize(out.len() + size, TX_EXTRA_TAG_PADDING),
            TXExtra::TxPublicKey(key) => {
                out.push(TX_EXTRA_TAG_PUBKEY);
                key.encode(out);
            }
            TXExtra::UserData(data) => write_short_blob(out, TX_EXTRA_TAG_USER_DATA, data),
            TXExtra::Alias(alias) => {
                out.push(TX_EXTRA_TAG_ALIAS);
                alias.write_entry(out, false);
            }
            TXExtra::Nonce(data) => write_short_blob(out, TX_EXTRA_TAG_NONCE, data),
            TXExtra::Unknown { tag, data } => {
                out.push(*tag);
                out.extend_from_slice(data);
            }
        }
    }
}

fn check_short_blob(data: &[u8]) -> Result<()> {
    ensure!(
        data.len() <= usize::from(u8::max_value()),
        Error::ExtraFieldTooLong(data.len())
    );
    Ok(())
}

fn read_short_blob(reader: &mut Reader<'_>) -> DecodeResult<Vec<u8>> {
    let length = usize::from(reader.read_u8()?);
    Ok(reader.read_bytes(length)?.to_vec())
}

/// Reads the record at the front of `rest`, returning it with its size
fn decode_field(rest: &[u8]) -> Option<(TXExtra, usize)> {
    let (&tag, body) = rest.split_first()?;
    if tag == TX_EXTRA_TAG_PADDING {
        return if body.iter().all(|byte| *byte == 0) {
            Some((TXExtra::Padding(rest.len()), rest.len()))
        } else {
            None
        };
    }

    let mut reader = Reader::new(body);
    let field = match tag {
        TX_EXTRA_TAG_PUBKEY => PublicKey::decode(&mut reader).map(TXExtra::TxPublicKey),
        TX_EXTRA_TAG_USER_DATA => read_short_blob(&mut reader).map(TXExtra::UserData),
        TX_EXTRA_TAG_ALIAS => AliasInfo::decode(&mut reader).map(TXExtra::Alias),
        TX_EXTRA_TAG_NONCE => read_short_blob(&mut reader).map(TXExtra::Nonce),
        _ => return None,
    };
    field.ok().map(|field| (field, rest.len() - reader.remaining()))
}

pub fn decode_extra(bytes: &[u8]) -> Vec<TXExtra> {
    let mut fields = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        match decode_field(rest) {
            Some((field, size)) => {
                fields.push(field);
                rest = &rest[size..];
            }
            None => {
                fields.push(TXExtra::Unknown {
                    tag: rest[0],
                    data: rest[1..].to_vec(),
                });
                break;
            }
        }
    }
    fields
}

/// Builds a user data blob out of its sub-records
pub fn make_user_data(payment_id: Option<&[u8]>, swap_address: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut user_data = Vec::new();
    for (tag, data) in [
        (USER_DATA_TAG_PAYMENT_ID, payment_id),
        (USER_DATA_TAG_SWAP_ADDRESS, swap_address),
    ]
    .iter()
    {
        if let Some(data) = data {
            check_short_blob(data)?;
            write_short_blob(&mut user_data, *tag, data);
        }
    }
    check_short_blob(&user_data)?;
    Ok(user_data)
}

/// Finds the first sub-record with the given tag in a user data blob
pub fn get_user_data_record(user_data: &[u8], tag: u8) -> Option<&[u8]> {
    let mut reader = Reader::new(user_data);
    while !reader.is_empty() {
        let record_tag = reader.read_u8().ok()?;
        let length = usize::from(reader.read_u8().ok()?);
        let data = reader.read_bytes(length).ok()?;
        if record_tag == tag {
            return Some(data);
        }
    }
    None
}

impl TransactionPrefix {
    /// Parses the extra field, rejecting duplicated records, invalid aliases and records that
    /// can't be written out as they are
    pub fn parse_and_validate_tx_extra(&self) -> Result<TxExtraInfo> {
        let mut info = TxExtraInfo::default();
        let last = self.extra.len().saturating_sub(1);
        for (index, field) in self.extra.iter().enumerate() {
            match field {
                TXExtra::TxPublicKey(key) => {
                    ensure!(
                        info.tx_pub_key.is_none(),
                        Error::DuplicateExtraField("public key")
                    );
                    info.tx_pub_key = Some(*key);
                }
                TXExtra::UserData(data) => {
                    check_short_blob(data)?;
                    ensure!(
                        info.user_data.is_none(),
                        Error::DuplicateExtraField("user data")
                    );
                    info.user_data = Some(data.clone());
                }
                TXExtra::Alias(alias) => {
                    ensure!(info.alias.is_none(), Error::DuplicateExtraField("alias"));
                    alias.validate()?;
                    info.alias = Some(alias.clone());
                }
                TXExtra::Nonce(data) => check_short_blob(data)?,
                TXExtra::Padding(size) => {
                    ensure!(
                        index == last && *size > 0,
                        Error::MisplacedExtraField("padding")
                    );
                }
                TXExtra::Unknown { tag, data } => {
                    ensure!(index == last, Error::MisplacedExtraField("unrecognised"));
                    debug!(
                        "Skipping unrecognised extra record {:#04x} ({} bytes)",
                        tag,
                        data.len()
                    );
                }
            }
        }

        // An unknown tail could still read back as known records
        let mut bytes = Vec::new();
        encode_extra(&self.extra, &mut bytes);
        ensure!(decode_extra(&bytes) == self.extra, Error::NonCanonicalExtra);

        Ok(info)
    }

    /// The transaction public key, required for scanning outputs
    pub fn tx_pub_key(&self) -> Result<PublicKey> {
        self.parse_and_validate_tx_extra()?
            .tx_pub_key
            .ok_or(Error::MissingTxPublicKey)
    }

    pub fn add_tx_pub_key_to_extra(&mut self, tx_pub_key: PublicKey) {
        self.extra.push(TXExtra::TxPublicKey(tx_pub_key));
    }

    pub fn add_tx_extra_nonce(&mut self, nonce: Vec<u8>) -> Result<()> {
        check_short_blob(&nonce)?;
        self.extra.push(TXExtra::Nonce(nonce));
        Ok(())
    }

    pub fn add_tx_extra_user_data(&mut self, user_data: Vec<u8>) -> Result<()> {
        check_short_blob(&user_data)?;
        self.extra.push(TXExtra::UserData(user_data));
        Ok(())
    }

    pub fn add_tx_extra_alias(&mut self, alias: AliasInfo) -> Result<()> {
        alias.validate()?;
        self.extra.push(TXExtra::Alias(alias));
        Ok(())
    }

    /// The payment ID carried in the user data, if any
    pub fn payment_id(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .parse_and_validate_tx_extra()?
            .user_data
            .and_then(|data| {
                get_user_data_record(&data, USER_DATA_TAG_PAYMENT_ID).map(<[u8]>::to_vec)
            }))
    }

    /// Whether the user data carries a swap address record
    pub fn is_swap_tx(&self) -> bool {
        self.parse_and_validate_tx_extra()
            .ok()
            .and_then(|info| info.user_data)
            .map_or(false, |data| {
                get_user_data_record(&data, USER_DATA_TAG_SWAP_ADDRESS).is_some()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crypto::KeyPair;

    use crate::Address;

    fn reencode(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_extra(&decode_extra(bytes), &mut out);
        out
    }

    #[test]
    fn it_decodes_known_records() {
        let key = KeyPair::generate().public_key;
        let mut bytes = vec![TX_EXTRA_TAG_PUBKEY];
        bytes.extend_from_slice(key.as_bytes());
        bytes.extend_from_slice(&[TX_EXTRA_TAG_NONCE, 2, 0xaa, 0xbb]);
        bytes.extend_from_slice(&[TX_EXTRA_TAG_USER_DATA, 0]);
        bytes.extend_from_slice(&[0, 0, 0]);

        assert_eq!(
            decode_extra(&bytes),
            vec![
                TXExtra::TxPublicKey(key),
                TXExtra::Nonce(vec![0xaa, 0xbb]),
                TXExtra::UserData(vec![]),
                TXExtra::Padding(3),
            ]
        );
        assert_eq!(reencode(&bytes), bytes);
    }

    #[test]
    fn it_keeps_malformed_tails() {
        let cases: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            vec![0, 0, 1],
            vec![TX_EXTRA_TAG_PUBKEY, 1, 2, 3],
            vec![TX_EXTRA_TAG_NONCE, 5, 1],
            vec![TX_EXTRA_TAG_ALIAS, 200, 0, b'a'],
            vec![TX_EXTRA_TAG_ALIAS, 1, 0x80],
            vec![0x09, 1, 2, 3],
            vec![TX_EXTRA_TAG_NONCE, 1, 7, 0x42],
        ];
        for bytes in cases {
            assert_eq!(reencode(&bytes), bytes);
        }

        assert_eq!(
            decode_extra(&[TX_EXTRA_TAG_NONCE, 1, 7, 0x42, 1]),
            vec![
                TXExtra::Nonce(vec![7]),
                TXExtra::Unknown {
                    tag: 0x42,
                    data: vec![1]
                }
            ]
        );
    }

    #[test]
    fn it_round_trips_alias_records() {
        let keys = KeyPair::generate();
        let alias = AliasInfo::new(
            "dave".to_string(),
            Address::standard(keys.public_key, KeyPair::generate().public_key),
            String::new(),
        );
        let mut prefix = TransactionPrefix::new(0);
        prefix.add_tx_extra_alias(alias.clone()).unwrap();
        prefix.add_tx_pub_key_to_extra(keys.public_key);

        let mut bytes = Vec::new();
        encode_extra(&prefix.extra, &mut bytes);
        assert_eq!(decode_extra(&bytes), prefix.extra);

        let info = prefix.parse_and_validate_tx_extra().unwrap();
        assert_eq!(info.alias, Some(alias));
        assert_eq!(info.tx_pub_key, Some(keys.public_key));
    }

    #[test]
    fn it_validates_extra_semantics() {
        let mut prefix = TransactionPrefix::new(0);
        assert_eq!(prefix.tx_pub_key(), Err(Error::MissingTxPublicKey));

        let key = KeyPair::generate().public_key;
        prefix.add_tx_pub_key_to_extra(key);
        assert_eq!(prefix.tx_pub_key(), Ok(key));

        prefix.add_tx_pub_key_to_extra(key);
        assert_eq!(
            prefix.tx_pub_key(),
            Err(Error::DuplicateExtraField("public key"))
        );

        let mut prefix = TransactionPrefix::new(0);
        assert!(prefix.add_tx_extra_nonce(vec![0; 256]).is_err());
        assert!(prefix.add_tx_extra_nonce(vec![0; 255]).is_ok());
        prefix.add_tx_extra_user_data(vec![1]).unwrap();
        prefix.add_tx_extra_user_data(vec![2]).unwrap();
        assert_eq!(
            prefix.parse_and_validate_tx_extra(),
            Err(Error::DuplicateExtraField("user data"))
        );
    }

    #[test]
    fn it_rejects_records_that_dont_survive_encoding() {
        let key = KeyPair::generate().public_key;
        let with_key = |fields: Vec<TXExtra>| {
            let mut prefix = TransactionPrefix::new(0);
            prefix.extra = fields;
            prefix.add_tx_pub_key_to_extra(key);
            prefix.parse_and_validate_tx_extra()
        };

        assert_eq!(
            with_key(vec![TXExtra::Nonce(vec![7; 300])]),
            Err(Error::ExtraFieldTooLong(300))
        );
        assert_eq!(
            with_key(vec![TXExtra::UserData(vec![1; 256])]),
            Err(Error::ExtraFieldTooLong(256))
        );
        // Padding ahead of the public key would swallow it
        assert_eq!(
            with_key(vec![TXExtra::Padding(2)]),
            Err(Error::MisplacedExtraField("padding"))
        );
        assert_eq!(
            with_key(vec![TXExtra::Unknown {
                tag: 0x42,
                data: vec![1]
            }]),
            Err(Error::MisplacedExtraField("unrecognised"))
        );

        let mut prefix = TransactionPrefix::new(0);
        prefix.add_tx_pub_key_to_extra(key);
        prefix.extra.push(TXExtra::Padding(0));
        assert_eq!(
            prefix.parse_and_validate_tx_extra(),
            Err(Error::MisplacedExtraField("padding"))
        );

        // A trailing unknown record holding a well formed nonce reads back as a nonce
        let mut prefix = TransactionPrefix::new(0);
        prefix.add_tx_pub_key_to_extra(key);
        prefix.extra.push(TXExtra::Unknown {
            tag: TX_EXTRA_TAG_NONCE,
            data: vec![1, 9],
        });
        assert_eq!(
            prefix.parse_and_validate_tx_extra(),
            Err(Error::NonCanonicalExtra)
        );

        // Trailing padding and unknown records decoded from bytes are accepted
        let mut bytes = vec![TX_EXTRA_TAG_PUBKEY];
        bytes.extend_from_slice(key.as_bytes());
        for tail in &[vec![0, 0, 0], vec![0x42, 1, 2]] {
            let mut prefix = TransactionPrefix::new(0);
            prefix.extra = decode_extra(&[&bytes[..], &tail[..]].concat());
            assert_eq!(prefix.tx_pub_key(), Ok(key));
        }
    }

    #[test]
    fn it_reads_user_data_records() {
        let payment_id = [7u8; 32];
        let swap = [9u8; SWAP_ADDRESS_SIZE];
        let user_data = make_user_data(Some(&payment_id), Some(&swap)).unwrap();
        assert_eq!(user_data.len(), 2 + 32 + 2 + 64);
        assert_eq!(
            get_user_data_record(&user_data, USER_DATA_TAG_PAYMENT_ID),
            Some(&payment_id[..])
        );
        assert_eq!(
            get_user_data_record(&user_data, USER_DATA_TAG_SWAP_ADDRESS),
            Some(&swap[..])
        );

        let mut prefix = TransactionPrefix::new(0);
        assert!(!prefix.is_swap_tx());
        assert_eq!(prefix.payment_id(), Ok(None));
        prefix.add_tx_extra_user_data(user_data).unwrap();
        assert!(prefix.is_swap_tx());
        assert_eq!(prefix.payment_id(), Ok(Some(payment_id.to_vec())));

        // Truncated sub-record
        assert_eq!(get_user_data_record(&[1, 5, 0], 1), None);
    }
}

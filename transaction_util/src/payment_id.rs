//! Module for payment IDs and the other user data records
//!
//! Swap addresses are encrypted by XOR'ing them with a keystream derived from the shared key
//! derivation, so only the holder of the matching view key can read them back.

use std::convert::TryFrom;

use common::{
    extra::{get_user_data_record, make_user_data, USER_DATA_TAG_SWAP_ADDRESS},
    Address, Decode, Encode, TransactionPrefix,
};
use crypto::{CNFastHash, Hash256, SecretKey};

use crate::{derivation::Derivation, Error, Result};

/// Domain separation byte of the user data keystream
const USER_DATA_KEYSTREAM_TAG: u8 = 0x8d;

/// Identifier tying a payment to an external reference
pub type PaymentId = Hash256;

/// Parses a payment ID from its 64 character hex form
pub fn parse_payment_id_from_hex_str(payment_id: &str) -> Result<PaymentId> {
    Hash256::try_from(payment_id).map_err(|_| Error::InvalidPaymentId)
}

/// Encrypts or decrypts `data` in place
///
/// The keystream is H(derivation || 0x8d || varint(block)) for consecutive blocks
pub fn crypt_user_data(data: &mut [u8], key_derivation: &Derivation) {
    let derivation = key_derivation.to_bytes();
    for (block, chunk) in data.chunks_mut(32).enumerate() {
        let keystream = CNFastHash::new()
            .chain(&derivation)
            .chain(&[USER_DATA_KEYSTREAM_TAG])
            .chain(varint::serialize(block as u64))
            .result();
        for (byte, key) in chunk.iter_mut().zip(keystream.as_bytes()) {
            *byte ^= key;
        }
    }
}

/// Attaches a user data record with the payment ID and, optionally, a swap address
///
/// The swap address is encrypted with the derivation between the transaction secret key and
/// the swap service's view key
pub fn set_payment_id_and_swap_addr_to_tx_extra(
    prefix: &mut TransactionPrefix,
    payment_id: Option<&PaymentId>,
    swap: Option<(&Address, &Derivation)>,
) -> Result<()> {
    let swap_record = swap.map(|(address, derivation)| {
        let mut record = address.to_blob();
        crypt_user_data(&mut record, derivation);
        record
    });

    let user_data = make_user_data(
        payment_id.map(Hash256::as_bytes),
        swap_record.as_ref().map(Vec::as_slice),
    )?;
    prefix.add_tx_extra_user_data(user_data)?;
    Ok(())
}

/// Reads the payment ID, failing if it isn't exactly 32 bytes
pub fn get_payment_id_from_tx_extra(prefix: &TransactionPrefix) -> Result<Option<PaymentId>> {
    match prefix.payment_id()? {
        Some(bytes) if bytes.len() == 32 => {
            let mut payment_id = [0; 32];
            payment_id.copy_from_slice(&bytes);
            Ok(Some(Hash256::from_bytes(payment_id)))
        }
        Some(_) => Err(Error::InvalidPaymentId),
        None => Ok(None),
    }
}

/// Decrypts the swap address with the swap service's view secret key
pub fn get_swap_info_from_tx_extra(
    prefix: &TransactionPrefix,
    view_secret_key: &SecretKey,
) -> Result<Option<Address>> {
    let info = prefix.parse_and_validate_tx_extra()?;
    let record = match info
        .user_data
        .as_ref()
        .and_then(|data| get_user_data_record(data, USER_DATA_TAG_SWAP_ADDRESS))
    {
        Some(record) => record.to_vec(),
        None => return Ok(None),
    };

    let tx_public_key = info.tx_pub_key.ok_or(common::Error::MissingTxPublicKey)?;
    let derivation =
        Derivation::from(view_secret_key, &tx_public_key).ok_or(Error::KeyDerivation)?;

    let mut record = record;
    crypt_user_data(&mut record, &derivation);
    Ok(Some(Address::from_blob(&record).map_err(common::Error::from)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crypto::KeyPair;

    use crate::AccountKeys;

    #[test]
    fn it_parses_payment_ids() {
        let hex_str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        assert_eq!(
            parse_payment_id_from_hex_str(hex_str).unwrap().to_string(),
            hex_str
        );
        assert!(parse_payment_id_from_hex_str("0123").is_err());
        assert!(parse_payment_id_from_hex_str(&"g".repeat(64)).is_err());
    }

    #[test]
    fn it_encrypts_user_data() {
        let derivation = Derivation::from(
            &KeyPair::generate().secret_key,
            &KeyPair::generate().public_key,
        )
        .unwrap();
        let plain: Vec<u8> = (0..100).collect();
        let mut data = plain.clone();

        crypt_user_data(&mut data, &derivation);
        assert_ne!(data, plain);
        // Blocks get distinct keystreams
        assert_ne!(
            data[..32].iter().zip(&plain[..32]).map(|(a, b)| a ^ b).collect::<Vec<_>>(),
            data[32..64].iter().zip(&plain[32..64]).map(|(a, b)| a ^ b).collect::<Vec<_>>()
        );
        crypt_user_data(&mut data, &derivation);
        assert_eq!(data, plain);
    }

    #[test]
    fn swap_addresses_are_readable_by_the_swap_service() {
        let tx_keypair = KeyPair::generate();
        let swap_service = AccountKeys::generate();
        let swap_target = AccountKeys::generate().address();
        let payment_id = crypto::cn_fast_hash(b"order 1");

        let mut prefix = TransactionPrefix::new(0);
        prefix.add_tx_pub_key_to_extra(tx_keypair.public_key);
        let derivation = Derivation::from(
            &tx_keypair.secret_key,
            &swap_service.view_keypair.public_key,
        )
        .unwrap();
        set_payment_id_and_swap_addr_to_tx_extra(
            &mut prefix,
            Some(&payment_id),
            Some((&swap_target, &derivation)),
        )
        .unwrap();

        assert!(prefix.is_swap_tx());
        assert_eq!(get_payment_id_from_tx_extra(&prefix).unwrap(), Some(payment_id));
        assert_eq!(
            get_swap_info_from_tx_extra(&prefix, &swap_service.view_keypair.secret_key).unwrap(),
            Some(swap_target)
        );
        // Anyone else reads garbage
        let other = AccountKeys::generate();
        assert_ne!(
            get_swap_info_from_tx_extra(&prefix, &other.view_keypair.secret_key).unwrap(),
            Some(swap_target)
        );
    }

    #[test]
    fn payment_ids_must_be_full_length() {
        let mut prefix = TransactionPrefix::new(0);
        assert_eq!(get_payment_id_from_tx_extra(&prefix).unwrap(), None);

        prefix
            .add_tx_extra_user_data(make_user_data(Some(&[1, 2, 3]), None).unwrap())
            .unwrap();
        assert!(matches!(
            get_payment_id_from_tx_extra(&prefix),
            Err(Error::InvalidPaymentId)
        ));
    }
}

//! Module for scanning transactions

use log::warn;

use common::{TXOutToKey, Transaction};
use crypto::{ring_signature::generate_key_image, KeyImage, KeyPair, PublicKey};

use crate::{account_keys::AccountKeys, derivation::Derivation, Error, Result};

/// Computes the one-time public key of output `output_index` paid to `spend_public_key`
pub fn derive_public_key(
    derivation: &Derivation,
    output_index: u64,
    spend_public_key: &PublicKey,
) -> Result<PublicKey> {
    derivation
        .derive_public_key(output_index, spend_public_key)
        .ok_or(Error::KeyDerivation)
}

/// Checks whether the given output pays to the account
pub fn is_out_to_acc(
    account_keys: &AccountKeys,
    output: &TXOutToKey,
    derivation: &Derivation,
    output_index: u64,
) -> bool {
    derivation
        .derive_public_key(output_index, &account_keys.spend_keypair.public_key)
        .map_or(false, |key| key == output.key)
}

/// Finds every output of the transaction paid to the account
///
/// # Returns
/// The indices of the owned outputs and the sum of their amounts
///
/// # Errors
/// If the transaction has no public key or the sum overflows
pub fn lookup_acc_outs(account_keys: &AccountKeys, tx: &Transaction) -> Result<(Vec<usize>, u64)> {
    let tx_public_key = tx.prefix.tx_pub_key()?;
    let derivation = Derivation::from(&account_keys.view_keypair.secret_key, &tx_public_key)
        .ok_or(Error::KeyDerivation)?;

    let mut owned = Vec::new();
    let mut received: u64 = 0;
    for (index, output) in tx.prefix.outputs.iter().enumerate() {
        // Other output kinds can't be paid to an account
        if let Ok(target) = output.target.as_key_output() {
            if is_out_to_acc(account_keys, target, &derivation, index as u64) {
                owned.push(index);
                received = received
                    .checked_add(output.amount)
                    .ok_or(Error::MoneyOverflow)?;
            }
        }
    }

    Ok((owned, received))
}

/// Recovers the ephemeral keypair of an owned output along with its key image
///
/// # Errors
/// If the account keys don't reproduce `output_key`
pub fn generate_key_image_helper(
    account_keys: &AccountKeys,
    tx_public_key: &PublicKey,
    real_output_index: u64,
    output_key: &PublicKey,
) -> Result<(KeyPair, KeyImage)> {
    let derivation = Derivation::from(&account_keys.view_keypair.secret_key, tx_public_key)
        .ok_or(Error::KeyDerivation)?;

    // x = H_s(aR || idx) + b
    let ephemeral_keypair = KeyPair::from(
        derivation.derive_secret_key(real_output_index, &account_keys.spend_keypair.secret_key),
    );
    if ephemeral_keypair.public_key != *output_key {
        warn!(
            "Derived output key {} doesn't match output {} key {}",
            hex::encode(ephemeral_keypair.public_key.as_bytes()),
            real_output_index,
            hex::encode(output_key.as_bytes())
        );
        return Err(Error::KeyImageMismatch {
            output_index: real_output_index,
        });
    }

    // KI = x * H_p(X)
    let key_image =
        generate_key_image(&ephemeral_keypair.public_key, &ephemeral_keypair.secret_key)?;

    Ok((ephemeral_keypair, key_image))
}

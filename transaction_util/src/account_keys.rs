use serde::{Deserialize, Serialize};

use common::Address;
use crypto::{ecc::hash_to_scalar, KeyPair, SecretKey};

/// A combination of a view and spend keypair which is used to create and recognize transactions
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountKeys {
    /// Spend keypair
    pub spend_keypair: KeyPair,
    /// View keypair
    pub view_keypair: KeyPair,
}

/// Deterministic keypair generation
///
/// The view secret key is derived by taking the Keccak (non-standard) hash of the spend secret key
impl From<SecretKey> for AccountKeys {
    fn from(spend_secret_key: SecretKey) -> AccountKeys {
        let view_secret_key = hash_to_scalar(spend_secret_key.as_bytes());

        AccountKeys {
            spend_keypair: KeyPair::from(spend_secret_key),
            view_keypair: KeyPair::from(view_secret_key),
        }
    }
}

impl AccountKeys {
    /// Generate a random account with a deterministic view key
    pub fn generate() -> AccountKeys {
        AccountKeys::from(KeyPair::generate().secret_key)
    }

    /// Generate an account keypair with distinct view and secret keys
    pub fn from_non_deterministic_keys(
        spend_secret_key: SecretKey,
        view_secret_key: SecretKey,
    ) -> AccountKeys {
        AccountKeys {
            spend_keypair: KeyPair::from(spend_secret_key),
            view_keypair: KeyPair::from(view_secret_key),
        }
    }

    /// Public address of the account
    pub fn address(&self) -> Address {
        Address::standard(
            self.spend_keypair.public_key,
            self.view_keypair.public_key,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_derives_view_keys_from_spend_keys() {
        let keys = AccountKeys::generate();
        assert_eq!(AccountKeys::from(keys.spend_keypair.secret_key), keys);
        assert_ne!(keys.spend_keypair, keys.view_keypair);
        assert!(keys.address().is_valid());
    }
}

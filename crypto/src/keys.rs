use serde::{Deserialize, Serialize};

use crate::ecc::{CompressedPoint, Scalar, BASEPOINT_TABLE};

/// An unsigned 256-bit value used as a private key. Represented with lowercase letters
pub type SecretKey = Scalar;

/// A compressed point on the elliptic curve. Usually determined by multiplication of a scalar
/// to the curve basepoint
///
/// Keys are kept in their 32 byte wire form so that decoding and re-encoding an object never
/// changes its bytes. Use `decompress` before doing group arithmetic.
pub type PublicKey = CompressedPoint;

/// Type alias specific to Cryptonote
pub type KeyImage = PublicKey;

/// A pair of a given secret key and its corresponding public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// The secret key
    pub secret_key: SecretKey,
    /// The public key
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a random keypair using the OS CSPRNG
    pub fn generate() -> Self {
        let secret_key = Scalar::random(&mut rand::rngs::OsRng);

        Self::from(secret_key)
    }
}

impl From<Scalar> for KeyPair {
    fn from(secret_key: SecretKey) -> Self {
        Self {
            secret_key,
            public_key: secret_key_to_public_key(&secret_key),
        }
    }
}

/// Computes `sG` for the given secret key
pub fn secret_key_to_public_key(secret_key: &SecretKey) -> PublicKey {
    (secret_key * &BASEPOINT_TABLE).compress()
}

/// Checks that the given bytes decode to a point on the curve
pub fn check_key(public_key: &PublicKey) -> bool {
    public_key.decompress().is_some()
}

/// Parses a secret key from its canonical 32 byte encoding
pub fn secret_key_from_bytes(bytes: [u8; 32]) -> Option<SecretKey> {
    Scalar::from_canonical_bytes(bytes)
}

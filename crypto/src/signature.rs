//! Single-key Schnorr signatures over a 32 byte message hash

use serde::{Deserialize, Serialize};

use crate::{
    ecc::{self, Point, Scalar, BASEPOINT_TABLE},
    hash::Hash256,
    keys::{PublicKey, SecretKey},
};

/// A `(c, r)` signature pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub c: Scalar,
    pub r: Scalar,
}

impl Signature {
    /// Wire form, `c || r`
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0; 64];
        bytes[..32].copy_from_slice(self.c.as_bytes());
        bytes[32..].copy_from_slice(self.r.as_bytes());
        bytes
    }

    /// Parses the wire form. Both halves must be canonical scalars
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        Some(Signature {
            c: Scalar::from_canonical_bytes(*array_ref!(bytes, 0, 32))?,
            r: Scalar::from_canonical_bytes(*array_ref!(bytes, 32, 32))?,
        })
    }
}

fn challenge(prefix_hash: &Hash256, public_key: &PublicKey, commitment: &Point) -> Scalar {
    let mut buf = Vec::with_capacity(96);
    buf.extend_from_slice(prefix_hash.as_bytes());
    buf.extend_from_slice(public_key.as_bytes());
    buf.extend_from_slice(commitment.compress().as_bytes());
    ecc::hash_to_scalar(&buf)
}

/// Signs `prefix_hash` with `secret_key`
///
/// `public_key` must be `secret_key * G`
pub fn generate_signature(
    prefix_hash: &Hash256,
    public_key: &PublicKey,
    secret_key: &SecretKey,
) -> Signature {
    let k = Scalar::random(&mut rand::rngs::OsRng);
    let c = challenge(prefix_hash, public_key, &(&k * &BASEPOINT_TABLE));

    Signature {
        c,
        r: k - c * secret_key,
    }
}

/// Verifies a signature produced by `generate_signature`
pub fn check_signature(prefix_hash: &Hash256, public_key: &PublicKey, signature: &Signature) -> bool {
    let point = match public_key.decompress() {
        Some(point) => point,
        None => return false,
    };

    // cP + rG = cP + (k - cx)G = kG
    let commitment = Point::vartime_double_scalar_mul_basepoint(&signature.c, &point, &signature.r);

    challenge(prefix_hash, public_key, &commitment) == signature.c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cn_fast_hash, KeyPair};

    #[test]
    fn signs_and_verifies() {
        let keypair = KeyPair::generate();
        let message = cn_fast_hash(b"alias update");

        let signature = generate_signature(&message, &keypair.public_key, &keypair.secret_key);
        assert!(check_signature(&message, &keypair.public_key, &signature));

        // Wrong message
        assert!(!check_signature(&cn_fast_hash(b"other"), &keypair.public_key, &signature));
        // Wrong key
        assert!(!check_signature(&message, &KeyPair::generate().public_key, &signature));
    }

    #[test]
    fn wire_form_is_stable() {
        let keypair = KeyPair::generate();
        let signature =
            generate_signature(&Hash256::null_hash(), &keypair.public_key, &keypair.secret_key);

        assert_eq!(Signature::from_bytes(&signature.to_bytes()), Some(signature));
        assert_eq!(Signature::from_bytes(&[0xff; 64]), None);
    }
}

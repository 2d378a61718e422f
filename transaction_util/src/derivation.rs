use crypto::{
    ecc::{hash_to_scalar, Point, Scalar, BASEPOINT_TABLE},
    PublicKey, SecretKey,
};

/// Wrapper around the result 8 * (secret key * public key)
///
/// Both sides of a payment reach the same derivation, as rA = aR = arG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derivation(pub(crate) Point);

impl Derivation {
    /// Create a new derivation from the given secret and public keys
    ///
    /// Returns `None` if the public key isn't a valid point
    pub fn from(scalar: &Scalar, public_key: &PublicKey) -> Option<Self> {
        let point = public_key.decompress()?;

        Some(Derivation((scalar * point).mul_by_cofactor()))
    }

    /// Compressed form of the derivation point
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Convert this derivation into a Scalar
    /// H_s(derivation || output_index)
    pub fn to_scalar(&self, output_index: u64) -> Scalar {
        let mut buf = self.to_bytes().to_vec();
        buf.extend_from_slice(&varint::serialize(output_index));

        hash_to_scalar(&buf)
    }

    /// One-time output key H_s(derivation || output_index)G + B
    ///
    /// Returns `None` if the spend public key isn't a valid point
    pub fn derive_public_key(
        &self,
        output_index: u64,
        spend_public_key: &PublicKey,
    ) -> Option<PublicKey> {
        let base = spend_public_key.decompress()?;

        Some((&self.to_scalar(output_index) * &BASEPOINT_TABLE + base).compress())
    }

    /// Secret key of a one-time output, H_s(derivation || output_index) + b
    pub fn derive_secret_key(&self, output_index: u64, spend_secret_key: &SecretKey) -> SecretKey {
        self.to_scalar(output_index) + spend_secret_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crypto::{keys::secret_key_to_public_key, KeyPair};

    #[test]
    fn both_sides_reach_the_same_derivation() {
        let tx_keypair = KeyPair::generate();
        let view_keypair = KeyPair::generate();
        let spend_keypair = KeyPair::generate();

        let sender = Derivation::from(&tx_keypair.secret_key, &view_keypair.public_key).unwrap();
        let receiver = Derivation::from(&view_keypair.secret_key, &tx_keypair.public_key).unwrap();
        assert_eq!(sender, receiver);

        for index in &[0, 1, 300] {
            let public_key = sender
                .derive_public_key(*index, &spend_keypair.public_key)
                .unwrap();
            let secret_key = receiver.derive_secret_key(*index, &spend_keypair.secret_key);
            assert_eq!(secret_key_to_public_key(&secret_key), public_key);
        }
        assert_ne!(sender.to_scalar(0), sender.to_scalar(1));
    }

    #[test]
    fn it_rejects_invalid_points() {
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        let invalid = PublicKey::from_slice(&bytes);
        assert!(Derivation::from(&Scalar::one(), &invalid).is_none());
    }
}

/// Error type for signature generation
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Returned when a public key does not decompress to a curve point
    #[error("Public key is not a valid curve point")]
    InvalidPublicKey,

    /// Returned when a key image does not decompress to a curve point
    #[error("Key image is not a valid curve point")]
    InvalidKeyImage,

    /// Returned when a hash fails to map onto the curve
    #[error("Hash did not map to a curve point")]
    InvalidHashedPoint,

    /// Returned when the signer's index lies outside of the ring
    #[error("Secret index {index} is outside of a ring of size {ring_size}")]
    SecretIndexOutOfBounds { index: usize, ring_size: usize },
}

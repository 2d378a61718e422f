//! # CryptoNote ring signatures
//! Proves knowledge of the secret key behind one member of a ring of public keys, and links
//! the signature to that member through its key image, without revealing which member it is
use crate::{
    ecc::{self, Point, Scalar, BASEPOINT_TABLE},
    hash::Hash256,
    keys::{KeyImage, PublicKey, SecretKey},
    signature::Signature,
    Error,
};

/// Generates the key image `I = x * H_p(P)` of a one-time keypair `(x, P)`
///
/// The image is the same whenever the same output is spent, which is what allows double
/// spends to be detected without knowing which ring member was spent
pub fn generate_key_image(
    public_key: &PublicKey,
    secret_key: &SecretKey,
) -> Result<KeyImage, Error> {
    Ok((secret_key * ecc::hash_to_point(public_key.as_bytes())?).compress())
}

fn decompress_ring(ring: &[PublicKey]) -> Result<Vec<Point>, Error> {
    ring.iter()
        .map(|key| key.decompress().ok_or(Error::InvalidPublicKey))
        .collect()
}

/// Signs `prefix_hash` with the key at `secret_index` in `ring`
///
/// The real member's signature is indistinguishable from the decoys' random ones, and every
/// member's commitments are computed with the same constant time operations
///
/// # Errors
/// If any key in the ring or the key image is not a valid point, or `secret_index` lies
/// outside the ring
pub fn generate_ring_signature(
    prefix_hash: &Hash256,
    key_image: &KeyImage,
    ring: &[PublicKey],
    secret_key: &SecretKey,
    secret_index: usize,
) -> Result<Vec<Signature>, Error> {
    if secret_index >= ring.len() {
        return Err(Error::SecretIndexOutOfBounds {
            index: secret_index,
            ring_size: ring.len(),
        });
    }
    let image = key_image.decompress().ok_or(Error::InvalidKeyImage)?;
    let points = decompress_ring(ring)?;

    let mut csprng = rand::rngs::OsRng;
    let mut buf = Vec::with_capacity(32 + 64 * ring.len());
    buf.extend_from_slice(prefix_hash.as_bytes());

    let mut sum = Scalar::zero();
    let mut k = Scalar::zero();
    let mut signatures = Vec::with_capacity(ring.len());
    for (i, (key, point)) in ring.iter().zip(points.iter()).enumerate() {
        let hashed_key = ecc::hash_to_point(key.as_bytes())?;
        let mut signature = Signature {
            c: Scalar::random(&mut csprng),
            r: Scalar::random(&mut csprng),
        };
        // The real member commits to k with a zero challenge
        if i == secret_index {
            k = signature.r;
            signature.c = Scalar::zero();
        } else {
            sum += signature.c;
        }

        let l = &signature.r * &BASEPOINT_TABLE + signature.c * point;
        let r = signature.r * hashed_key + signature.c * image;
        signatures.push(signature);
        buf.extend_from_slice(l.compress().as_bytes());
        buf.extend_from_slice(r.compress().as_bytes());
    }

    // Close the ring at the real index
    let c = ecc::hash_to_scalar(&buf) - sum;
    signatures[secret_index] = Signature {
        c,
        r: k - c * secret_key,
    };

    Ok(signatures)
}

/// Verifies a ring signature over `prefix_hash`
pub fn check_ring_signature(
    prefix_hash: &Hash256,
    key_image: &KeyImage,
    ring: &[PublicKey],
    signatures: &[Signature],
) -> bool {
    if ring.is_empty() || ring.len() != signatures.len() {
        return false;
    }
    let image = match key_image.decompress() {
        Some(image) if image.is_torsion_free() => image,
        _ => return false,
    };
    let points = match decompress_ring(ring) {
        Ok(points) => points,
        Err(_) => return false,
    };

    let mut buf = Vec::with_capacity(32 + 64 * ring.len());
    buf.extend_from_slice(prefix_hash.as_bytes());

    let mut sum = Scalar::zero();
    for ((key, point), signature) in ring.iter().zip(points.iter()).zip(signatures) {
        let hashed_key = match ecc::hash_to_point(key.as_bytes()) {
            Ok(hashed_key) => hashed_key,
            Err(_) => return false,
        };
        let l = Point::vartime_double_scalar_mul_basepoint(&signature.c, point, &signature.r);
        let r = signature.r * hashed_key + signature.c * image;
        buf.extend_from_slice(l.compress().as_bytes());
        buf.extend_from_slice(r.compress().as_bytes());
        sum += signature.c;
    }

    ecc::hash_to_scalar(&buf) == sum
}

use crate::{field::FieldElement, hash::cn_fast_hash, Error};

pub use curve25519_dalek::constants::ED25519_BASEPOINT_COMPRESSED as BASEPOINT_COMPRESSED;
pub use curve25519_dalek::constants::ED25519_BASEPOINT_POINT as BASEPOINT;
pub use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE as BASEPOINT_TABLE;
pub use curve25519_dalek::edwards::CompressedEdwardsY as CompressedPoint;
pub use curve25519_dalek::edwards::EdwardsPoint as Point;
pub use curve25519_dalek::scalar::Scalar;

/// Maps arbitrary data to a scalar, `H_s(data)`
///
/// The Keccak hash of the data is reduced modulo the group order
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    Scalar::from_bytes_mod_order(cn_fast_hash(data).to_bytes())
}

/// Montgomery curve coefficient `A` of curve25519
const MONTGOMERY_A: [u8; 32] = [
    0x06, 0x6d, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// `sqrt(-1)`
const SQRT_M1: [u8; 32] = [
    0xb0, 0xa0, 0x0e, 0x4a, 0x27, 0x1b, 0xee, 0xc4, 0x78, 0xe4, 0x2f, 0xad, 0x06, 0x18, 0x43, 0x2f,
    0xa7, 0xd7, 0xfb, 0x3d, 0x99, 0x00, 0x4d, 0x2b, 0x0b, 0xdf, 0xc1, 0x4f, 0x80, 0x24, 0x83, 0x2b,
];

/// `sqrt(-2 * A * (A + 2))`
const FFFB1: [u8; 32] = [
    0xee, 0x41, 0x1c, 0x32, 0x75, 0x69, 0xa7, 0x22, 0x8d, 0x73, 0x2a, 0xb9, 0xa8, 0x04, 0x94, 0xd1,
    0xe3, 0x19, 0xfb, 0x41, 0x37, 0xc5, 0xa9, 0x20, 0x17, 0x1b, 0xd6, 0xda, 0xef, 0xfb, 0x71, 0x7e,
];

/// `sqrt(2 * A * (A + 2))`
const FFFB2: [u8; 32] = [
    0xe0, 0x9a, 0x7c, 0x60, 0x83, 0x64, 0xde, 0xd2, 0xdf, 0xf7, 0x56, 0x04, 0x46, 0x03, 0xde, 0x51,
    0xbe, 0x5f, 0x16, 0xc0, 0xb7, 0x51, 0xd4, 0x91, 0xf6, 0x2c, 0x5a, 0x04, 0x0a, 0x1e, 0x06, 0x4d,
];

/// `sqrt(-sqrt(-1) * A * (A + 2))`
const FFFB3: [u8; 32] = [
    0x66, 0x2c, 0x30, 0x17, 0x87, 0x7d, 0x1b, 0x58, 0x29, 0x42, 0x96, 0xa5, 0x4e, 0xff, 0x24, 0x40,
    0xed, 0xa2, 0x0d, 0x3f, 0x40, 0x46, 0x95, 0xb8, 0xef, 0x08, 0xc2, 0x14, 0x0d, 0x11, 0x4a, 0x67,
];

/// `sqrt(sqrt(-1) * A * (A + 2))`
const FFFB4: [u8; 32] = [
    0x86, 0x91, 0xb3, 0xb6, 0x03, 0x19, 0x3d, 0x85, 0x49, 0x4a, 0x3f, 0xa1, 0x08, 0xfc, 0x46, 0xee,
    0x2e, 0x43, 0xf7, 0x7e, 0x88, 0xf4, 0xc0, 0x26, 0xf9, 0xdb, 0x67, 0x10, 0x03, 0xf3, 0x43, 0x1a,
];

/// Maps 32 bytes onto the curve, `ge_fromfe_frombytes_vartime`
///
/// All 256 bits are read as a field element `u`, which is sent through an Elligator-style map
/// to a point of the Montgomery curve and converted to Edwards form. Every input yields a
/// point, without any retries.
fn map_to_curve(bytes: &[u8; 32]) -> CompressedPoint {
    let a = FieldElement::from_bytes(&MONTGOMERY_A);

    let u = FieldElement::from_bytes(bytes);
    let v = u.square() + u.square(); // 2u^2
    let w = v + FieldElement::ONE; // 2u^2 + 1
    let x = w.square() - a.square() * v; // w^2 - 2A^2u^2

    // (w / x)^((p + 3) / 8)
    let x3 = x.square() * x;
    let x7 = x3.square() * x;
    let mut r_x = w * x3 * (w * x7).pow_p58();

    let check = r_x.square() * x;
    let (mut r_z, sign) = if (w - check).is_zero() {
        r_x = r_x * FieldElement::from_bytes(&FFFB2) * u;
        (-a * v, false)
    } else if (w + check).is_zero() {
        r_x = r_x * FieldElement::from_bytes(&FFFB1) * u;
        (-a * v, false)
    } else {
        let check = check * FieldElement::from_bytes(&SQRT_M1);
        r_x = if (w - check).is_zero() {
            r_x * FieldElement::from_bytes(&FFFB4)
        } else {
            r_x * FieldElement::from_bytes(&FFFB3)
        };
        (-a, true)
    };
    if r_x.is_negative() != sign {
        r_x = -r_x;
    }

    let r_y = r_z - w;
    r_z = r_z + w;
    r_x = r_x * r_z;

    let z_inv = r_z.invert();
    let mut compressed = (r_y * z_inv).to_bytes();
    if (r_x * z_inv).is_negative() {
        compressed[31] |= 0x80;
    }
    CompressedPoint(compressed)
}

/// Maps arbitrary data to a point of the prime order subgroup, `H_p(data)`
///
/// The Keccak hash of the data is mapped onto the curve and multiplied by the cofactor.
///
/// # Errors
/// Never in practice: the mapped point is always on the curve, but its decompression is
/// still checked
pub fn hash_to_point(data: &[u8]) -> Result<Point, Error> {
    map_to_curve(&cn_fast_hash(data).to_bytes())
        .decompress()
        .map(|point| point.mul_by_cofactor())
        .ok_or(Error::InvalidHashedPoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    use curve25519_dalek::traits::IsIdentity;

    fn hashed(data: &[u8]) -> String {
        hex::encode(hash_to_point(data).unwrap().compress().as_bytes())
    }

    #[test]
    fn it_maps_hashes_onto_the_curve() {
        // One input per branch of the map, with and without the top bit of the hash set
        let vectors: &[(&[u8], &str)] = &[
            (b"key 0", "4a311896c1ff486f94aa933adebb10e0d375f185485f40b5d5656395c3415e56"),
            (b"key 1", "df9b4fa59b40f2d4e96d0f76c8d2af444b6f8fbb11fc3a0e504bbfbe2e9dd202"),
            (b"key 2", "30f70f8754773a104247505de1426b6d61ff5044a0d97d667753aafc56f78ecc"),
            (b"key 3", "c8284984a3579617fe4ff098f7a8097dff5c280b835d164b102cd0598c3f9d19"),
            (b"key 4", "003840925a1fc830339c14b15ac48cb528f99108c4e74e5126175d3c81972bfa"),
            (b"key 7", "437a65638b6b5ee9f51df6d9a7cb7654ca763c42baab170ca0728c3ab5b0f479"),
            (b"key 13", "474785e98402ab26b6d0a0b05f6122487d3f8f3a9fe40c34a2572e9ee1bdb3e0"),
            (b"key 18", "7aed99db1fe6fb8c4a4fa3a06a2ff5cda3726bb18e8ed41d215d1e5da4465fd1"),
        ];
        for (data, expected) in vectors {
            assert_eq!(hashed(data), *expected);
        }
        assert_eq!(
            hashed(BASEPOINT_COMPRESSED.as_bytes()),
            "d6329b5b1f7c0805b5c345f4957554002a2f557845f64d7645dae0e051a6498a"
        );
    }

    #[test]
    fn hash_to_point_is_in_subgroup() {
        for i in 0..32u8 {
            let point = hash_to_point(&[i; 7]).unwrap();
            assert!(point.is_torsion_free());
            assert!(!point.is_identity());
        }
    }

    #[test]
    fn square_root_of_minus_one_is_correct() {
        let i = FieldElement::from_bytes(&SQRT_M1);
        assert_eq!(i.square(), -FieldElement::ONE);
    }

    #[test]
    fn hash_to_scalar_is_reduced() {
        let scalar = hash_to_scalar(b"amount");
        assert!(scalar.is_canonical());
        assert_eq!(scalar, hash_to_scalar(b"amount"));
    }

    #[test]
    fn basepoint_compresses_to_the_known_encoding() {
        assert_eq!(
            hex::encode(BASEPOINT.compress().as_bytes()),
            "5866666666666666666666666666666666666666666666666666666666666666"
        );
        assert_eq!(BASEPOINT_COMPRESSED, BASEPOINT.compress());
    }
}

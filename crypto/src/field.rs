//! Arithmetic modulo `p = 2^255 - 19`, as needed to map hashes onto the curve
//!
//! Elements are held as five 51-bit limbs. Nothing here runs in constant time, so it must only
//! ever see public data.

use std::ops::{Add, Mul, Neg, Sub};

use byteorder::{ByteOrder, LittleEndian};

const LOW_51_BITS: u64 = (1 << 51) - 1;

/// `(p - 5) / 8`, little endian
const P_MINUS_5_DIV_8: [u8; 32] = [
    0xfd, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f,
];

/// `p - 2`, little endian
const P_MINUS_2: [u8; 32] = [
    0xeb, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
];

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldElement([u64; 5]);

impl FieldElement {
    pub(crate) const ZERO: FieldElement = FieldElement([0; 5]);
    pub(crate) const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0]);

    /// Loads all 256 bits of `bytes`, reducing modulo `p`
    ///
    /// Unlike point decompression the top bit is part of the value.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let w0 = LittleEndian::read_u64(&bytes[0..8]);
        let w1 = LittleEndian::read_u64(&bytes[8..16]);
        let w2 = LittleEndian::read_u64(&bytes[16..24]);
        let w3 = LittleEndian::read_u64(&bytes[24..32]);
        FieldElement([
            w0 & LOW_51_BITS,
            ((w0 >> 51) | (w1 << 13)) & LOW_51_BITS,
            ((w1 >> 38) | (w2 << 26)) & LOW_51_BITS,
            ((w2 >> 25) | (w3 << 39)) & LOW_51_BITS,
            w3 >> 12,
        ])
        .reduce()
    }

    /// Canonical little endian encoding, fully reduced
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut limbs = self.reduce().0;

        // Subtract p once if the value is at least p
        let mut q = (limbs[0] + 19) >> 51;
        q = (limbs[1] + q) >> 51;
        q = (limbs[2] + q) >> 51;
        q = (limbs[3] + q) >> 51;
        q = (limbs[4] + q) >> 51;

        limbs[0] += 19 * q;
        limbs[1] += limbs[0] >> 51;
        limbs[0] &= LOW_51_BITS;
        limbs[2] += limbs[1] >> 51;
        limbs[1] &= LOW_51_BITS;
        limbs[3] += limbs[2] >> 51;
        limbs[2] &= LOW_51_BITS;
        limbs[4] += limbs[3] >> 51;
        limbs[3] &= LOW_51_BITS;
        limbs[4] &= LOW_51_BITS;

        let mut bytes = [0u8; 32];
        LittleEndian::write_u64(&mut bytes[0..8], limbs[0] | (limbs[1] << 51));
        LittleEndian::write_u64(&mut bytes[8..16], (limbs[1] >> 13) | (limbs[2] << 38));
        LittleEndian::write_u64(&mut bytes[16..24], (limbs[2] >> 26) | (limbs[3] << 25));
        LittleEndian::write_u64(&mut bytes[24..32], (limbs[3] >> 39) | (limbs[4] << 12));
        bytes
    }

    fn reduce(self) -> FieldElement {
        let mut limbs = self.0;
        let c0 = limbs[0] >> 51;
        let c1 = limbs[1] >> 51;
        let c2 = limbs[2] >> 51;
        let c3 = limbs[3] >> 51;
        let c4 = limbs[4] >> 51;
        limbs[0] &= LOW_51_BITS;
        limbs[1] &= LOW_51_BITS;
        limbs[2] &= LOW_51_BITS;
        limbs[3] &= LOW_51_BITS;
        limbs[4] &= LOW_51_BITS;
        limbs[0] += c4 * 19;
        limbs[1] += c0;
        limbs[2] += c1;
        limbs[3] += c2;
        limbs[4] += c3;
        FieldElement(limbs)
    }

    pub(crate) fn is_zero(self) -> bool {
        self.to_bytes() == [0u8; 32]
    }

    /// Whether the canonical encoding is odd
    pub(crate) fn is_negative(self) -> bool {
        self.to_bytes()[0] & 1 == 1
    }

    pub(crate) fn square(self) -> FieldElement {
        self * self
    }

    /// Raises `self` to a little endian exponent
    fn pow(self, exponent: &[u8; 32]) -> FieldElement {
        let mut result = FieldElement::ONE;
        for byte in exponent.iter().rev() {
            for bit in (0..8).rev() {
                result = result.square();
                if (byte >> bit) & 1 == 1 {
                    result = result * self;
                }
            }
        }
        result
    }

    /// `self^((p - 5) / 8)`
    pub(crate) fn pow_p58(self) -> FieldElement {
        self.pow(&P_MINUS_5_DIV_8)
    }

    pub(crate) fn invert(self) -> FieldElement {
        self.pow(&P_MINUS_2)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &FieldElement) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FieldElement {}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        let (a, b) = (self.0, rhs.0);
        FieldElement([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3], a[4] + b[4]]).reduce()
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        // Add 16p first so no limb underflows
        let (a, b) = (self.0, rhs.0);
        FieldElement([
            (a[0] + 36_028_797_018_963_664) - b[0],
            (a[1] + 36_028_797_018_963_952) - b[1],
            (a[2] + 36_028_797_018_963_952) - b[2],
            (a[3] + 36_028_797_018_963_952) - b[3],
            (a[4] + 36_028_797_018_963_952) - b[4],
        ])
        .reduce()
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        FieldElement::ZERO - self
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            u128::from(x) * u128::from(y)
        }

        let (a, b) = (self.0, rhs.0);
        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let c0 = m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19);
        let mut c1 =
            m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19);
        let mut c2 =
            m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19);
        let mut c3 =
            m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19);
        let mut c4 = m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]);

        c1 += c0 >> 51;
        c2 += c1 >> 51;
        c3 += c2 >> 51;
        c4 += c3 >> 51;

        let mut out = [
            (c0 as u64) & LOW_51_BITS,
            (c1 as u64) & LOW_51_BITS,
            (c2 as u64) & LOW_51_BITS,
            (c3 as u64) & LOW_51_BITS,
            (c4 as u64) & LOW_51_BITS,
        ];
        out[0] += ((c4 >> 51) as u64) * 19;
        out[1] += out[0] >> 51;
        out[0] &= LOW_51_BITS;
        FieldElement(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_u64(value: u64) -> FieldElement {
        let mut bytes = [0u8; 32];
        LittleEndian::write_u64(&mut bytes[0..8], value);
        FieldElement::from_bytes(&bytes)
    }

    #[test]
    fn it_reduces_modulo_p() {
        // p itself and 2^255 (= 19 mod p)
        let mut p = [0xffu8; 32];
        p[0] = 0xed;
        p[31] = 0x7f;
        assert!(FieldElement::from_bytes(&p).is_zero());

        let mut two_255 = [0u8; 32];
        two_255[31] = 0x80;
        assert_eq!(FieldElement::from_bytes(&two_255), from_u64(19));
        assert_eq!(FieldElement::from_bytes(&two_255).to_bytes()[0], 19);
    }

    #[test]
    fn it_does_arithmetic() {
        let a = from_u64(1 << 40);
        let b = from_u64(12345);
        assert_eq!(a * b, from_u64((1 << 40) * 12345));
        assert_eq!(a - b + b, a);
        assert_eq!(b - a + a, b);
        assert!((-a + a).is_zero());
        assert_eq!(a * a.invert(), FieldElement::ONE);

        // -1 is even, 1 is odd
        assert!(!(-FieldElement::ONE).is_negative());
        assert!(FieldElement::ONE.is_negative());
    }
}

//! Variable length integers as used in the CryptoNote binary format
//!
//! Each byte carries 7 bits of the value, least significant group first. The high bit of a
//! byte is set when more bytes follow.

/// Maximum number of bytes a `u64` can occupy
pub const MAX_VARINT_LEN: usize = 10;

/// Error type for varint decoding
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The input ended before the last byte of the varint
    #[error("Varint is truncated")]
    Truncated,

    /// The value does not fit in 64 bits
    #[error("Varint overflows 64 bits")]
    Overflow,

    /// The value has a redundant trailing zero group
    #[error("Varint is not minimally encoded")]
    NonCanonical,
}

pub fn serialize(mut n: u64) -> Vec<u8> {
    let mut vec = Vec::with_capacity(MAX_VARINT_LEN);

    while n > 127 {
        vec.push(128 | n as u8);
        n >>= 7;
    }

    vec.push(n as u8);

    vec
}

/// Decodes a varint from the start of `bytes`
///
/// # Returns
/// The decoded value and the number of bytes it occupied
///
/// # Errors
/// If the varint is truncated, overflows a `u64` or isn't minimally encoded
pub fn deserialize(bytes: &[u8]) -> Result<(u64, usize), Error> {
    let mut n: u64 = 0;

    for (i, byte) in bytes.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(Error::Overflow);
        }
        let group = u64::from(byte & 127);
        let shift = 7 * i as u32;
        // The tenth byte only has room for a single bit
        if shift == 63 && group > 1 {
            return Err(Error::Overflow);
        }
        n |= group << shift;

        if *byte < 128 {
            if group == 0 && i > 0 {
                return Err(Error::NonCanonical);
            }
            return Ok((n, i + 1));
        }
    }

    Err(Error::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        assert_eq!(serialize(0), vec![0x00]);
        assert_eq!(serialize(127), vec![0x7f]);
        assert_eq!(serialize(128), vec![0x80, 0x01]);
        assert_eq!(serialize(300), vec![0xac, 0x02]);
        assert_eq!(serialize(u64::max_value()).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn decodes_what_it_encodes() {
        for &value in &[0, 1, 127, 128, 16383, 16384, 1 << 35, u64::max_value()] {
            let bytes = serialize(value);
            assert_eq!(deserialize(&bytes), Ok((value, bytes.len())));
        }
    }

    #[test]
    fn ignores_trailing_bytes() {
        assert_eq!(deserialize(&[0xac, 0x02, 0xff]), Ok((300, 2)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(deserialize(&[]), Err(Error::Truncated));
        assert_eq!(deserialize(&[0x80, 0x80]), Err(Error::Truncated));
        assert_eq!(deserialize(&[0x80, 0x00]), Err(Error::NonCanonical));
        assert_eq!(
            deserialize(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]),
            Err(Error::Overflow)
        );
        assert_eq!(deserialize(&[0x80; 11]), Err(Error::Overflow));
    }
}

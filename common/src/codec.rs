//! Canonical binary encoding of consensus objects
//!
//! Every object has exactly one byte representation. Decoding either consumes a whole value
//! or fails without handing back anything partially filled.

use byteorder::{ByteOrder, LittleEndian};

use crypto::{Hash256, PublicKey, Signature};
use ensure_macro::ensure;

/// Errors raised while decoding a blob. The whole blob must be rejected when one occurs
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The blob ended in the middle of a value
    #[error("Blob ended unexpectedly")]
    UnexpectedEnd,

    /// A varint was malformed
    #[error(transparent)]
    Varint(#[from] varint::Error),

    /// A variant tag that this codec doesn't know about
    #[error("Unknown {kind} tag {tag:#04x}")]
    UnknownTag { kind: &'static str, tag: u8 },

    /// A collection claims more elements than the blob can hold
    #[error("Collection length {0} exceeds the remaining blob")]
    LengthTooLarge(u64),

    /// An integer field doesn't fit its in-memory type
    #[error("Value {0} is out of range")]
    ValueOutOfRange(u64),

    /// An object version this codec doesn't understand
    #[error("Unsupported object version {0}")]
    UnsupportedVersion(u64),

    /// A scalar isn't reduced modulo the group order
    #[error("Scalar is not canonically encoded")]
    NonCanonicalScalar,

    /// Text fields must be UTF-8
    #[error("Text field is not valid UTF-8")]
    InvalidText,

    /// The blob holds more bytes than the object it encodes
    #[error("{0} trailing bytes after object")]
    TrailingBytes(usize),
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Types with a canonical byte representation
pub trait Encode {
    /// Appends the canonical bytes of `self` to `out`
    fn encode(&self, out: &mut Vec<u8>);

    /// Returns the canonical bytes of `self`
    fn to_blob(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// Types that can be read back from their canonical bytes
pub trait Decode: Sized {
    /// Reads one value from the front of `reader`
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self>;

    /// Decodes a value that must span the whole of `blob`
    fn from_blob(blob: &[u8]) -> DecodeResult<Self> {
        let mut reader = Reader::new(blob);
        let value = Self::decode(&mut reader)?;
        ensure!(
            reader.is_empty(),
            DecodeError::TrailingBytes(reader.remaining())
        );
        Ok(value)
    }
}

/// Cursor over a blob being decoded
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read_bytes(&mut self, count: usize) -> DecodeResult<&'a [u8]> {
        ensure!(count <= self.data.len(), DecodeError::UnexpectedEnd);
        let (head, tail) = self.data.split_at(count);
        self.data = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u64_le(&mut self) -> DecodeResult<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        let (value, used) = varint::deserialize(self.data)?;
        self.data = &self.data[used..];
        Ok(value)
    }

    /// Reads a varint that must fit in a `u8`
    pub fn read_varint_u8(&mut self) -> DecodeResult<u8> {
        let value = self.read_varint()?;
        ensure!(value <= u64::from(u8::max_value()), DecodeError::ValueOutOfRange(value));
        Ok(value as u8)
    }

    /// Reads a collection length, rejecting lengths that couldn't possibly fit in the rest of
    /// the blob given the smallest encoding of an element
    pub fn read_length(&mut self, min_element_size: usize) -> DecodeResult<usize> {
        let length = self.read_varint()?;
        let max = (self.data.len() / min_element_size.max(1)) as u64;
        ensure!(length <= max, DecodeError::LengthTooLarge(length));
        Ok(length as usize)
    }

    pub fn read_32(&mut self) -> DecodeResult<[u8; 32]> {
        let mut bytes = [0; 32];
        bytes.copy_from_slice(self.read_bytes(32)?);
        Ok(bytes)
    }

    /// Reads a varint length followed by that many raw bytes
    pub fn read_blob(&mut self) -> DecodeResult<Vec<u8>> {
        let length = self.read_length(1)?;
        Ok(self.read_bytes(length)?.to_vec())
    }
}

pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&varint::serialize(value));
}

/// Writes a varint length followed by the raw bytes
pub fn write_blob(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

impl Encode for Hash256 {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl Decode for Hash256 {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(Hash256::from_bytes(reader.read_32()?))
    }
}

impl Encode for PublicKey {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl Decode for PublicKey {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        Ok(PublicKey::from_slice(&reader.read_32()?))
    }
}

impl Encode for Signature {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

impl Decode for Signature {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let mut bytes = [0; 64];
        bytes.copy_from_slice(reader.read_bytes(64)?);
        Signature::from_bytes(&bytes).ok_or(DecodeError::NonCanonicalScalar)
    }
}

/// Vectors are a varint count followed by the elements
impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.len() as u64);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let length = reader.read_length(1)?;
        (0..length).map(|_| T::decode(reader)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_tracks_position() {
        let mut reader = Reader::new(&[0xac, 0x02, 0x07, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(reader.read_varint(), Ok(300));
        assert_eq!(reader.read_u8(), Ok(7));
        assert_eq!(reader.read_u64_le(), Ok(0x0807_0605_0403_0201));
        assert!(reader.is_empty());
        assert_eq!(reader.read_u8(), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn rejects_oversized_lengths() {
        // Claims 100 elements with only 2 bytes left
        let mut reader = Reader::new(&[100, 0, 0]);
        assert_eq!(reader.read_length(1), Err(DecodeError::LengthTooLarge(100)));

        let mut reader = Reader::new(&[2, 0, 0]);
        assert_eq!(reader.read_length(32), Err(DecodeError::LengthTooLarge(2)));
    }

    #[test]
    fn hash_vectors_use_varint_counts() {
        let hashes = vec![Hash256::null_hash(), crypto::cn_fast_hash(b"")];
        let blob = hashes.to_blob();
        assert_eq!(blob.len(), 1 + 64);
        assert_eq!(Vec::<Hash256>::from_blob(&blob), Ok(hashes));
        assert_eq!(
            Vec::<Hash256>::from_blob(&[blob.clone(), vec![0]].concat()),
            Err(DecodeError::TrailingBytes(1))
        );
    }
}

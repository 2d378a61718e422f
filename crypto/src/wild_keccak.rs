//! # Wild Keccak
//! Keccak sponge whose state is perturbed between rounds by a caller-provided "mixin",
//! normally built from scratchpad entries selected by the state itself. Used as the
//! proof-of-work hash.
use byteorder::{ByteOrder, LittleEndian};

use crate::hash::{Hash256, Hash256Data};

/// Keccak-f[1600] state
pub type KeccakState = [u64; 25];

/// Values XORed into the first 24 state words before every round but the first
pub type Mixin = [u64; 24];

pub const KECCAK_ROUNDS: usize = 24;

/// Rate of the sponge for a 32 byte output
pub const HASH_DATA_AREA: usize = 136;

const ROUND_CONSTANTS: [u64; KECCAK_ROUNDS] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

const ROTATIONS: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

const PI_LANES: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Column parity used by the theta step
pub trait ThetaVariant {
    fn column(st: &KeccakState, i: usize) -> u64;
}

/// Standard Keccak theta. With an all-zero mixin the sponge is plain Keccak-256
pub struct RegularTheta;

impl ThetaVariant for RegularTheta {
    #[inline(always)]
    fn column(st: &KeccakState, i: usize) -> u64 {
        st[i] ^ st[i + 5] ^ st[i + 10] ^ st[i + 15] ^ st[i + 20]
    }
}

/// Theta with the last three lanes of a column multiplied together instead of XORed
pub struct MulTheta;

impl ThetaVariant for MulTheta {
    #[inline(always)]
    fn column(st: &KeccakState, i: usize) -> u64 {
        st[i] ^ st[i + 5] ^ st[i + 10].wrapping_mul(st[i + 15]).wrapping_mul(st[i + 20])
    }
}

/// A single Keccak-f round
fn keccakf_round<T: ThetaVariant>(st: &mut KeccakState, round: usize) {
    let mut bc: [u64; 5] = [0; 5];

    // Theta
    for (i, column) in bc.iter_mut().enumerate() {
        *column = T::column(st, i);
    }
    for i in 0..5 {
        let t = bc[(i + 4) % 5] ^ bc[(i + 1) % 5].rotate_left(1);
        for j in (0..25).step_by(5) {
            st[j + i] ^= t;
        }
    }

    // Rho Pi
    let mut t = st[1];
    for (&lane, &rotation) in PI_LANES.iter().zip(ROTATIONS.iter()) {
        let next = st[lane];
        st[lane] = t.rotate_left(rotation);
        t = next;
    }

    // Chi
    for j in (0..25).step_by(5) {
        bc.copy_from_slice(&st[j..(j + 5)]);
        for i in 0..5 {
            st[j + i] ^= !bc[(i + 1) % 5] & bc[(i + 2) % 5];
        }
    }

    // Iota
    st[0] ^= ROUND_CONSTANTS[round];
}

fn permute<T, F>(st: &mut KeccakState, mix: &mut F)
where
    T: ThetaVariant,
    F: FnMut(&KeccakState, &mut Mixin),
{
    for round in 0..KECCAK_ROUNDS {
        // The first round runs on the freshly absorbed block
        if round != 0 {
            let mut mixin: Mixin = [0; 24];
            mix(st, &mut mixin);
            for (word, m) in st.iter_mut().zip(mixin.iter()) {
                *word ^= m;
            }
        }
        keccakf_round::<T>(st, round);
    }
}

fn absorb(st: &mut KeccakState, block: &[u8]) {
    for (word, chunk) in st.iter_mut().zip(block.chunks_exact(8)) {
        *word ^= LittleEndian::read_u64(chunk);
    }
}

/// Hashes `input` into 32 bytes, calling `mix` before every round but the first of each
/// permutation
pub fn wild_keccak<T, F>(input: &[u8], mix: &mut F) -> Hash256
where
    T: ThetaVariant,
    F: FnMut(&KeccakState, &mut Mixin),
{
    let mut st: KeccakState = [0; 25];

    let mut blocks = input.chunks_exact(HASH_DATA_AREA);
    for block in &mut blocks {
        absorb(&mut st, block);
        permute::<T, F>(&mut st, mix);
    }

    // Last block and padding
    let remainder = blocks.remainder();
    let mut temp: [u8; HASH_DATA_AREA] = [0; HASH_DATA_AREA];
    temp[..remainder.len()].copy_from_slice(remainder);
    temp[remainder.len()] = 1;
    temp[HASH_DATA_AREA - 1] |= 0x80;
    absorb(&mut st, &temp);
    permute::<T, F>(&mut st, mix);

    let mut out: [u8; 32] = [0; 32];
    LittleEndian::write_u64_into(&st[..4], &mut out);
    Hash256::from(Hash256Data::from(out))
}

/// Runs `wild_keccak` twice, the second time over the output of the first
pub fn wild_keccak_dbl<T, F>(input: &[u8], mix: &mut F) -> Hash256
where
    T: ThetaVariant,
    F: FnMut(&KeccakState, &mut Mixin),
{
    let first = wild_keccak::<T, F>(input, mix);
    wild_keccak::<T, F>(first.as_bytes(), mix)
}

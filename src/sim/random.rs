//! Deterministic seeded random number generator
//!
//! mulberry32 over a 32-bit state. World generation, monster placement and
//! monster AI each draw from an explicit `SeededRandom`; nothing in the
//! simulation touches an ambient RNG.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// FNV-1a offset basis / prime used by [`hash_seed`]
const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// mulberry32 increment
const MULBERRY_STEP: u32 = 0x6d2b_79f5;

/// Hash an arbitrary seed string to a 32-bit seed.
///
/// Only the low byte of each UTF-16 code unit participates, so the hash is
/// stable for the same visible string regardless of platform. An empty
/// string hashes the same as `"seed"`.
pub fn hash_seed(seed: &str) -> u32 {
    let seed = if seed.is_empty() { "seed" } else { seed };
    seed.encode_utf16().fold(FNV_OFFSET, |h, unit| {
        (h ^ u32::from(unit & 0xff)).wrapping_mul(FNV_PRIME)
    })
}

/// mulberry32 stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Stream for a string seed (see [`hash_seed`])
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(hash_seed(seed))
    }

    /// Next raw 32-bit output
    #[inline]
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_STEP);
        let mut x = self.state;
        x = (x ^ (x >> 15)).wrapping_mul(x | 1);
        x ^= x.wrapping_add((x ^ (x >> 7)).wrapping_mul(x | 61));
        x ^ (x >> 14)
    }

    /// Uniform f64 in [0, 1)
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / 4_294_967_296.0
    }

    /// `floor(next_f64() * n)` as an integer in [0, n)
    #[inline]
    pub fn below(&mut self, n: i32) -> i32 {
        (self.next_f64() * f64::from(n)).floor() as i32
    }

    /// True with probability `p`
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// `min + next_f64() * spread`
    #[inline]
    pub fn spread(&mut self, (min, spread): (f64, f64)) -> f64 {
        min + self.next_f64() * spread
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_raw());
        let hi = u64::from(self.next_raw());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for SeededRandom {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

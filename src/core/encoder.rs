use smallvec::SmallVec;

use crate::core::error::Error;
use crate::core::symbol::{complement, BaseCode, BASE_A, BASE_C};

pub const MAX_KSIZE: u32 = 31;

/// Canonical k-mer encoding under reverse-complement equivalence.
///
/// A k-mer and its reverse complement always encode to the same value: the
/// middle base decides orientation (if it is A or C the forward strand is
/// encoded, otherwise the reverse complement is), and since the middle base
/// is then always A or C, it costs one bit instead of two. Total width is
/// `2*k - 1` bits.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    k: u32,
    mid: usize,
}

impl Encoder {
    pub fn new(k: u32) -> Result<Self, Error> {
        if k == 0 || k > MAX_KSIZE || k % 2 == 0 {
            return Err(Error::UnsupportedK { k, max: MAX_KSIZE });
        }
        Ok(Encoder {
            k,
            mid: (k / 2) as usize,
        })
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    /// Total bit width of an encoded k-mer: `2*k - 1`.
    pub fn width_bits(&self) -> u32 {
        2 * self.k - 1
    }

    /// Encodes `codes` (exactly `k` base codes) into its canonical value.
    pub fn encode(&self, codes: &[BaseCode]) -> u64 {
        debug_assert_eq!(codes.len(), self.k as usize);
        let m = self.mid;
        let forward = codes[m] == BASE_A || codes[m] == BASE_C;
        let mut value: u64 = 0;
        if forward {
            for (i, &c) in codes.iter().enumerate() {
                if i == m {
                    value = (value << 1) | (c & 1) as u64;
                } else {
                    value = (value << 2) | c as u64;
                }
            }
        } else {
            for (i, &c) in codes.iter().enumerate().rev() {
                let rc = complement(c);
                if i == m {
                    value = (value << 1) | (rc & 1) as u64;
                } else {
                    value = (value << 2) | rc as u64;
                }
            }
        }
        value
    }

    /// Reconstructs the canonical base sequence a code was built from.
    pub fn decode(&self, code: u64) -> SmallVec<[BaseCode; 32]> {
        let k = self.k as usize;
        let m = self.mid;
        let mut bases: SmallVec<[BaseCode; 32]> = smallvec::smallvec![0; k];
        let mut remaining = code;
        for i in (0..k).rev() {
            if i == m {
                let bit = remaining & 1;
                remaining >>= 1;
                bases[i] = if bit == 0 { BASE_A } else { BASE_C };
            } else {
                let bits = remaining & 0b11;
                remaining >>= 2;
                bases[i] = bits as BaseCode;
            }
        }
        bases
    }
}

//! Elias-Fano encoding of non-decreasing sequences.
//!
//! # Theory
//!
//! For `n` values with maximum `u`, each value is split at
//! `L = floor(log2(u / n))` bits:
//!
//! - the low `L` bits are stored verbatim, `n * L` bits in total;
//! - the high part `v >> L` is stored in unary inside an upper bit vector of
//!   length `(u >> L) + n`, by setting bit `(v_i >> L) + i`.
//!
//! Since the high parts are non-decreasing, the `i`-th set bit of the upper
//! vector sits at `high_i + i`, so `select(i) - i` recovers `high_i` without
//! touching any other element. Equal values simply produce adjacent set bits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bitvec::{BitBuilder, BitVector};
use crate::error::CompressionError;
use crate::traits::{check_index, validate_non_decreasing, SortedCodec};

/// Elias-Fano encoded sequence with random access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawEliasFano"))]
pub struct EliasFano {
    len: usize,
    universe: u64,
    low_width: u32,
    /// `len` fixed-width fields of `low_width` bits each.
    low_bits: BitBuilder,
    upper: BitVector,
}

/// Unchecked wire form of [`EliasFano`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawEliasFano {
    len: usize,
    universe: u64,
    low_width: u32,
    low_bits: BitBuilder,
    upper: BitVector,
}

#[cfg(feature = "serde")]
impl TryFrom<RawEliasFano> for EliasFano {
    type Error = CompressionError;

    fn try_from(raw: RawEliasFano) -> Result<Self, Self::Error> {
        let invalid = |msg: String| -> Result<Self, CompressionError> {
            Err(CompressionError::InvalidEncoding(msg))
        };

        if raw.low_width > 63 {
            return invalid(format!("low bit width {} exceeds 63", raw.low_width));
        }
        if raw.len.checked_mul(raw.low_width as usize) != Some(raw.low_bits.len()) {
            return invalid(format!(
                "{} low bits do not hold {} fields of {} bits",
                raw.low_bits.len(),
                raw.len,
                raw.low_width
            ));
        }
        if raw.upper.count_ones() != raw.len {
            return invalid(format!(
                "upper bits mark {} elements, expected {}",
                raw.upper.count_ones(),
                raw.len
            ));
        }

        Ok(Self {
            len: raw.len,
            universe: raw.universe,
            low_width: raw.low_width,
            low_bits: raw.low_bits,
            upper: raw.upper,
        })
    }
}

impl EliasFano {
    /// Largest encoded value (the last element), or 0 when empty.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Number of low bits stored explicitly per element.
    pub fn low_bit_width(&self) -> u32 {
        self.low_width
    }

    /// The upper (unary high parts) bit vector.
    pub fn upper(&self) -> &BitVector {
        &self.upper
    }

    /// `floor(log2(universe / n))`, or 0 when the ratio is 0.
    fn low_width_for(universe: u64, n: usize) -> u32 {
        let ratio = universe / n as u64;
        if ratio == 0 {
            0
        } else {
            63 - ratio.leading_zeros()
        }
    }

    fn element(&self, i: usize) -> Result<u64, CompressionError> {
        let high = (self.upper.select(i)? - i) as u64;
        let low = self
            .low_bits
            .read_bits(i * self.low_width as usize, self.low_width)?;
        Ok((high << self.low_width) | low)
    }
}

impl SortedCodec for EliasFano {
    fn encode(values: &[u64]) -> Result<Self, CompressionError> {
        validate_non_decreasing(values)?;

        let Some(&universe) = values.last() else {
            return Ok(Self::default());
        };

        let n = values.len();
        let low_width = Self::low_width_for(universe, n);
        let upper_len = (universe >> low_width) as usize + n;

        let mut low_bits = BitBuilder::with_capacity(n * low_width as usize);
        let mut upper = BitBuilder::with_capacity(upper_len);

        for (i, &value) in values.iter().enumerate() {
            low_bits.push_bits(value, low_width);

            let pos = (value >> low_width) as usize + i;
            upper.push_zeros(pos - upper.len());
            upper.push(true);
        }
        upper.push_zeros(upper_len - upper.len());

        let ef = Self {
            len: n,
            universe,
            low_width,
            low_bits,
            upper: upper.build(),
        };

        debug!(
            n,
            universe,
            low_width,
            bits = ef.size_in_bits(),
            "elias-fano encoded"
        );
        Ok(ef)
    }

    fn name(&self) -> &'static str {
        "EliasFano"
    }

    fn len(&self) -> usize {
        self.len
    }

    fn decode(&self) -> Result<Vec<u64>, CompressionError> {
        (0..self.len).map(|i| self.element(i)).collect()
    }

    fn access(&self, index: usize) -> Result<u64, CompressionError> {
        check_index(index, self.len)?;
        self.element(index)
    }

    fn size_in_bits(&self) -> usize {
        self.len * self.low_width as usize + self.upper.len()
    }
}

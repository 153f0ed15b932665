//! Golomb-Rice coding of the gaps of a non-decreasing sequence.
//!
//! The sequence is turned into gaps (`v[0] + 1`, then `v[i] - v[i-1]`) and
//! each gap `g` is written with modulus `M` as:
//!
//! - the quotient `g / M` in unary: that many `0` bits, then a `1`;
//! - the remainder `g % M` in truncated binary with `b = ceil(log2 M)` and
//!   `threshold = 2^b - M`: remainders below the threshold take `b - 1`
//!   bits, the rest are written as `r + threshold` in `b` bits.
//!
//! `M` is the mean gap rounded up, which is close to optimal for roughly
//! geometric gap distributions. The stream is only decodable front to back,
//! so `access(i)` costs O(i).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bitvec::BitBuilder;
use crate::error::CompressionError;
use crate::traits::{check_index, validate_non_decreasing, SortedCodec};

/// Golomb-Rice delta encoded sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGolombRiceDelta"))]
pub struct GolombRiceDelta {
    len: usize,
    modulus: u64,
    bits: BitBuilder,
}

/// Unchecked wire form of [`GolombRiceDelta`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawGolombRiceDelta {
    len: usize,
    modulus: u64,
    bits: BitBuilder,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGolombRiceDelta> for GolombRiceDelta {
    type Error = CompressionError;

    fn try_from(raw: RawGolombRiceDelta) -> Result<Self, Self::Error> {
        if raw.modulus == 0 {
            return Err(CompressionError::InvalidEncoding(
                "golomb modulus must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            len: raw.len,
            modulus: raw.modulus,
            bits: raw.bits,
        })
    }
}

/// Truncated-binary parameters derived from the modulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RemainderCode {
    modulus: u64,
    width: u32,
    threshold: u64,
}

impl RemainderCode {
    fn new(modulus: u64) -> Self {
        debug_assert!(modulus >= 1);
        let width = if modulus > 1 {
            64 - (modulus - 1).leading_zeros()
        } else {
            1
        };
        // width == 64 only for modulus > 2^63, so the result fits in u64.
        let threshold = ((1u128 << width) - modulus as u128) as u64;
        Self {
            modulus,
            width,
            threshold,
        }
    }

    fn write(&self, gap: u64, out: &mut BitBuilder) {
        let q = gap / self.modulus;
        let r = gap % self.modulus;

        out.push_zeros(q as usize);
        out.push(true);

        if r < self.threshold {
            out.push_bits(r, self.width - 1);
        } else {
            out.push_bits(r + self.threshold, self.width);
        }
    }
}

/// Ceiling of the mean gap, at least 1.
fn compute_modulus(gaps: &[u64]) -> u64 {
    if gaps.is_empty() {
        return 1;
    }
    let n = gaps.len() as u128;
    let sum: u128 = gaps.iter().map(|&g| g as u128).sum();
    (sum.div_ceil(n) as u64).max(1)
}

fn gaps_of(values: &[u64]) -> Result<Vec<u64>, CompressionError> {
    let Some(&first) = values.first() else {
        return Ok(Vec::new());
    };
    let mut gaps = Vec::with_capacity(values.len());
    gaps.push(
        first
            .checked_add(1)
            .ok_or(CompressionError::ValueOverflow { value: first })?,
    );
    gaps.extend(values.windows(2).map(|w| w[1] - w[0]));
    Ok(gaps)
}

/// Sequential gap decoder; yields `None` once the stream runs out.
struct GapReader<'a> {
    bits: &'a BitBuilder,
    pos: usize,
    code: RemainderCode,
}

impl Iterator for GapReader<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let mut q = 0u64;
        while !self.bits.get(self.pos).ok()? {
            q += 1;
            self.pos += 1;
        }
        self.pos += 1;

        let RemainderCode {
            modulus,
            width,
            threshold,
        } = self.code;

        let short = self.bits.read_bits(self.pos, width - 1).ok()?;
        let r = if short < threshold {
            self.pos += (width - 1) as usize;
            short
        } else {
            let full = self.bits.read_bits(self.pos, width).ok()?;
            self.pos += width as usize;
            full - threshold
        };

        q.checked_mul(modulus)?.checked_add(r)
    }
}

/// Running sum over decoded gaps.
struct Values<'a> {
    gaps: GapReader<'a>,
    prev: Option<u64>,
}

impl Iterator for Values<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let gap = self.gaps.next()?;
        let value = match self.prev {
            None => gap.checked_sub(1)?,
            Some(prev) => prev.checked_add(gap)?,
        };
        self.prev = Some(value);
        Some(value)
    }
}

impl GolombRiceDelta {
    /// The Golomb modulus `M`.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// The raw encoded bit stream.
    pub fn bits(&self) -> &BitBuilder {
        &self.bits
    }

    /// Iterate over decoded values from the start of the stream.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        Values {
            gaps: GapReader {
                bits: &self.bits,
                pos: 0,
                code: RemainderCode::new(self.modulus),
            },
            prev: None,
        }
    }

    /// Decode at most `num_values` values.
    ///
    /// Stops early, returning what was decoded, if the stream is exhausted
    /// first. Never reads past the end of the stream.
    pub fn decode_count(&self, num_values: usize) -> Vec<u64> {
        // Every codeword takes at least one bit.
        let mut out = Vec::with_capacity(num_values.min(self.len).min(self.bits.len()));
        out.extend(self.iter().take(num_values));
        if out.len() < num_values {
            trace!(
                requested = num_values,
                decoded = out.len(),
                "golomb stream exhausted"
            );
        }
        out
    }
}

impl SortedCodec for GolombRiceDelta {
    fn encode(values: &[u64]) -> Result<Self, CompressionError> {
        validate_non_decreasing(values)?;

        let gaps = gaps_of(values)?;
        let modulus = compute_modulus(&gaps);
        let code = RemainderCode::new(modulus);

        let mut bits = BitBuilder::new();
        for &gap in &gaps {
            code.write(gap, &mut bits);
        }

        debug!(
            n = values.len(),
            modulus,
            remainder_bits = code.width,
            threshold = code.threshold,
            bits = bits.len(),
            "golomb-rice encoded"
        );

        Ok(Self {
            len: values.len(),
            modulus,
            bits,
        })
    }

    fn name(&self) -> &'static str {
        "GolombRice"
    }

    fn len(&self) -> usize {
        self.len
    }

    fn decode(&self) -> Result<Vec<u64>, CompressionError> {
        Ok(self.decode_count(self.len))
    }

    fn access(&self, index: usize) -> Result<u64, CompressionError> {
        check_index(index, self.len)?;
        self.iter()
            .nth(index)
            .ok_or(CompressionError::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    fn size_in_bits(&self) -> usize {
        self.bits.len()
    }
}

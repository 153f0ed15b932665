//! Packed bit sequences with rank/select.
//!
//! Bits are packed into 64-bit words, most-significant bit first: bit `i`
//! lives in word `i / 64` at shift `63 - i % 64`. The packing is private to
//! this module; callers only see bit positions.
//!
//! Building and querying are split across two types:
//!
//! - [`BitBuilder`]: growable, append-only. Also used directly as a raw bit
//!   stream where no rank/select is needed.
//! - [`BitVector`]: frozen by [`BitBuilder::build`], which computes the
//!   cumulative per-word popcount table backing `rank` and `select`.
//!
//! # Complexity
//!
//! | Operation | Time |
//! |-----------|------|
//! | `push` | O(1) amortized |
//! | `build` | O(words) |
//! | `get` | O(1) |
//! | `rank` | O(1) |
//! | `select` | O(log words + 64) |

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CompressionError;

const WORD_BITS: usize = 64;

/// Mask selecting the top `n` bits of a word (`n` in `0..=64`).
#[inline]
fn high_mask(n: usize) -> u64 {
    if n == 0 {
        0
    } else {
        !0u64 << (WORD_BITS - n)
    }
}

#[inline]
fn bit_at(words: &[u64], index: usize) -> bool {
    (words[index / WORD_BITS] >> (WORD_BITS - 1 - index % WORD_BITS)) & 1 == 1
}

/// Position (from the top) of the `k`-th set bit of `word`.
///
/// Caller guarantees `k < word.count_ones()`.
#[inline]
fn select_in_word(word: u64, k: usize) -> usize {
    let mut w = word;
    for _ in 0..k {
        // Clear the highest remaining set bit.
        w &= !(1u64 << (WORD_BITS as u32 - 1 - w.leading_zeros()));
    }
    w.leading_zeros() as usize
}

fn read_bits_in(
    words: &[u64],
    len: usize,
    pos: usize,
    width: u32,
) -> Result<u64, CompressionError> {
    if width > 64 {
        return Err(CompressionError::WidthTooLarge { width });
    }
    let end = pos.saturating_add(width as usize);
    if end > len {
        return Err(CompressionError::PositionOutOfRange { pos: end, len });
    }
    if width == 0 {
        return Ok(0);
    }

    let width = width as usize;
    let word_idx = pos / WORD_BITS;
    let offset = pos % WORD_BITS;
    let avail = WORD_BITS - offset;

    if width <= avail {
        return Ok((words[word_idx] << offset) >> (WORD_BITS - width));
    }

    // Straddles two words; offset > 0 here.
    let rest = width - avail;
    let head = words[word_idx] & ((1u64 << avail) - 1);
    let tail = words[word_idx + 1] >> (WORD_BITS - rest);
    Ok((head << rest) | tail)
}

/// Growable, append-only bit sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBitBuilder"))]
pub struct BitBuilder {
    words: Vec<u64>,
    len: usize,
}

impl BitBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no bits have been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / WORD_BITS] |= 1u64 << (WORD_BITS - 1 - self.len % WORD_BITS);
        }
        self.len += 1;
    }

    /// Append `count` zero bits.
    pub fn push_zeros(&mut self, count: usize) {
        self.len += count;
        self.words.resize(self.len.div_ceil(WORD_BITS), 0);
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: u32) {
        for shift in (0..width).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    /// Read the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool, CompressionError> {
        if index >= self.len {
            return Err(CompressionError::PositionOutOfRange {
                pos: index,
                len: self.len,
            });
        }
        Ok(bit_at(&self.words, index))
    }

    /// Read `width` (at most 64) bits starting at `pos` as a big-endian integer.
    pub fn read_bits(&self, pos: usize, width: u32) -> Result<u64, CompressionError> {
        read_bits_in(&self.words, self.len, pos, width)
    }

    /// Total number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| bit_at(&self.words, i))
    }

    /// Freeze the bits and compute the rank table.
    pub fn build(self) -> BitVector {
        let mut block_ranks = Vec::with_capacity(self.words.len() + 1);
        let mut sum = 0usize;
        for word in &self.words {
            block_ranks.push(sum);
            sum += word.count_ones() as usize;
        }
        // Sentinel: rank at the end of the last word.
        block_ranks.push(sum);

        BitVector {
            bits: self,
            block_ranks,
        }
    }
}

impl fmt::Display for BitBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Immutable bit vector with constant-time rank and logarithmic select.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawBitVector"))]
pub struct BitVector {
    bits: BitBuilder,
    /// `block_ranks[i]` = set bits in words `[0, i)`; one extra trailing entry.
    /// Rebuilt from `bits` on deserialization.
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    block_ranks: Vec<usize>,
}

impl BitVector {
    /// Length in bits.
    pub fn len(&self) -> usize {
        self.bits.len
    }

    /// True if the vector holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.len == 0
    }

    /// Total number of set bits.
    pub fn count_ones(&self) -> usize {
        self.block_ranks.last().copied().unwrap_or(0)
    }

    /// Read the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool, CompressionError> {
        self.bits.get(index)
    }

    /// Read `width` (at most 64) bits starting at `pos` as a big-endian integer.
    pub fn read_bits(&self, pos: usize, width: u32) -> Result<u64, CompressionError> {
        self.bits.read_bits(pos, width)
    }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter()
    }

    /// Number of set bits in `[0, pos)`.
    pub fn rank(&self, pos: usize) -> Result<usize, CompressionError> {
        let len = self.bits.len;
        if pos > len {
            return Err(CompressionError::PositionOutOfRange { pos, len });
        }

        let block = pos / WORD_BITS;
        let offset = pos % WORD_BITS;
        let mut rank = self.block_ranks[block];
        if offset > 0 {
            rank += (self.bits.words[block] & high_mask(offset)).count_ones() as usize;
        }
        Ok(rank)
    }

    /// Position of the `k`-th set bit (0-indexed).
    pub fn select(&self, k: usize) -> Result<usize, CompressionError> {
        let ones = self.count_ones();
        if k >= ones {
            return Err(CompressionError::SelectOutOfRange { rank: k, ones });
        }

        // Last word whose preceding-ones count is <= k.
        let block = self.block_ranks.partition_point(|&r| r <= k) - 1;
        let local = k - self.block_ranks[block];
        Ok(block * WORD_BITS + select_in_word(self.bits.words[block], local))
    }
}

impl Default for BitVector {
    fn default() -> Self {
        BitBuilder::new().build()
    }
}

impl From<BitBuilder> for BitVector {
    fn from(bits: BitBuilder) -> Self {
        bits.build()
    }
}

/// Unchecked wire form of [`BitBuilder`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBitBuilder {
    words: Vec<u64>,
    len: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBitBuilder> for BitBuilder {
    type Error = CompressionError;

    fn try_from(raw: RawBitBuilder) -> Result<Self, Self::Error> {
        let RawBitBuilder { words, len } = raw;
        if words.len() != len.div_ceil(WORD_BITS) {
            return Err(CompressionError::InvalidEncoding(format!(
                "{} words cannot hold exactly {len} bits",
                words.len()
            )));
        }
        let tail = len % WORD_BITS;
        if let Some(&last) = words.last() {
            if tail > 0 && last & !high_mask(tail) != 0 {
                return Err(CompressionError::InvalidEncoding(
                    "set bits past the end of the sequence".to_string(),
                ));
            }
        }
        Ok(Self { words, len })
    }
}

/// Wire form of [`BitVector`]; the rank table is never trusted.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBitVector {
    bits: BitBuilder,
}

#[cfg(feature = "serde")]
impl From<RawBitVector> for BitVector {
    fn from(raw: RawBitVector) -> Self {
        raw.bits.build()
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.bits, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_str(bits: &str) -> BitVector {
        let mut builder = BitBuilder::new();
        for c in bits.chars() {
            builder.push(c == '1');
        }
        builder.build()
    }

    #[test]
    fn test_msb_first_packing() {
        let mut builder = BitBuilder::new();
        builder.push(true);
        builder.push(false);
        builder.push(true);
        assert_eq!(builder.words, vec![0b101u64 << 61]);
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.to_string(), "101");
    }

    #[test]
    fn test_push_grows_one_word_per_64_bits() {
        let mut builder = BitBuilder::new();
        for i in 0..129 {
            builder.push(i % 3 == 0);
        }
        assert_eq!(builder.words.len(), 3);
        assert_eq!(builder.count_ones(), 43);
    }

    #[test]
    fn test_get_out_of_range() {
        let bv = from_str("0110");
        assert_eq!(bv.get(1), Ok(true));
        assert_eq!(bv.get(3), Ok(false));
        assert_eq!(
            bv.get(4),
            Err(CompressionError::PositionOutOfRange { pos: 4, len: 4 })
        );
    }

    #[test]
    fn test_rank_small() {
        let bv = from_str("10110001");
        let expected = [0, 1, 1, 2, 3, 3, 3, 3, 4];
        for (pos, &r) in expected.iter().enumerate() {
            assert_eq!(bv.rank(pos).unwrap(), r, "rank({pos})");
        }
        assert!(bv.rank(9).is_err());
    }

    #[test]
    fn test_rank_at_word_boundaries() {
        let mut builder = BitBuilder::new();
        for _ in 0..128 {
            builder.push(true);
        }
        let bv = builder.build();
        assert_eq!(bv.rank(0).unwrap(), 0);
        assert_eq!(bv.rank(63).unwrap(), 63);
        assert_eq!(bv.rank(64).unwrap(), 64);
        assert_eq!(bv.rank(65).unwrap(), 65);
        assert_eq!(bv.rank(128).unwrap(), 128);
    }

    #[test]
    fn test_select_small() {
        let bv = from_str("10110001");
        assert_eq!(bv.select(0).unwrap(), 0);
        assert_eq!(bv.select(1).unwrap(), 2);
        assert_eq!(bv.select(2).unwrap(), 3);
        assert_eq!(bv.select(3).unwrap(), 7);
        assert_eq!(
            bv.select(4),
            Err(CompressionError::SelectOutOfRange { rank: 4, ones: 4 })
        );
    }

    #[test]
    fn test_select_skips_empty_words() {
        let mut builder = BitBuilder::new();
        builder.push(true);
        builder.push_zeros(300);
        builder.push(true);
        builder.push_zeros(10);
        let bv = builder.build();
        assert_eq!(bv.len(), 312);
        assert_eq!(bv.count_ones(), 2);
        assert_eq!(bv.select(0).unwrap(), 0);
        assert_eq!(bv.select(1).unwrap(), 301);
        assert_eq!(bv.rank(301).unwrap(), 1);
        assert_eq!(bv.rank(302).unwrap(), 2);
    }

    #[test]
    fn test_all_zero_vector() {
        let mut builder = BitBuilder::new();
        for _ in 0..640 {
            builder.push(false);
        }
        let bv = builder.build();
        for pos in 0..=640 {
            assert_eq!(bv.rank(pos).unwrap(), 0);
        }
        assert!(bv.select(0).is_err());
        assert!(bv.select(639).is_err());
    }

    #[test]
    fn test_empty_vector() {
        let bv = BitBuilder::new().build();
        assert!(bv.is_empty());
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.rank(0).unwrap(), 0);
        assert!(bv.rank(1).is_err());
        assert!(bv.select(0).is_err());
        assert_eq!(bv.to_string(), "");
    }

    #[test]
    fn test_rank_select_inverse() {
        let mut builder = BitBuilder::new();
        for i in 0..1000usize {
            builder.push(i.wrapping_mul(2654435761) % 7 < 2);
        }
        let bv = builder.build();
        for k in 0..bv.count_ones() {
            assert_eq!(bv.rank(bv.select(k).unwrap()).unwrap(), k);
        }
        for p in 0..bv.len() {
            if bv.get(p).unwrap() {
                assert_eq!(bv.select(bv.rank(p).unwrap()).unwrap(), p);
            }
        }
    }

    #[test]
    fn test_push_and_read_bits() {
        let mut builder = BitBuilder::new();
        builder.push_zeros(60);
        builder.push_bits(0b1011_0110, 8);
        builder.push_bits(u64::MAX, 64);
        assert_eq!(builder.len(), 132);
        assert_eq!(builder.read_bits(60, 8).unwrap(), 0b1011_0110);
        assert_eq!(builder.read_bits(62, 4).unwrap(), 0b1101);
        assert_eq!(builder.read_bits(68, 64).unwrap(), u64::MAX);
        assert_eq!(builder.read_bits(0, 0).unwrap(), 0);
        assert!(builder.read_bits(100, 33).is_err());
        assert_eq!(
            builder.read_bits(0, 65),
            Err(CompressionError::WidthTooLarge { width: 65 })
        );
    }

    #[test]
    fn test_push_zeros_then_push() {
        let mut builder = BitBuilder::new();
        builder.push_zeros(64);
        builder.push(true);
        assert_eq!(builder.words.len(), 2);
        assert_eq!(builder.get(64), Ok(true));
        assert_eq!(builder.count_ones(), 1);
    }
}

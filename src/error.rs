//! Error type shared by the bit vector and both codecs.

/// Errors returned by encoding and query operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    /// Input values were not in non-decreasing order.
    #[error("values are not non-decreasing at index {index}: prev={prev}, next={next}")]
    InvalidInputOrder {
        /// Index where the order violation occurred.
        index: usize,
        /// Previous value (expected `<= next`).
        prev: u64,
        /// Value found at `index`.
        next: u64,
    },
    /// Element index past the end of an encoded sequence.
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange {
        /// Requested element index.
        index: usize,
        /// Number of encoded elements.
        len: usize,
    },
    /// Bit position past the end of a bit vector.
    #[error("bit position {pos} out of range for bit vector of length {len}")]
    PositionOutOfRange {
        /// Requested bit position (or end of the requested range).
        pos: usize,
        /// Length of the bit vector in bits.
        len: usize,
    },
    /// `select` asked for a set bit that does not exist.
    #[error("select({rank}) out of range: bit vector has {ones} set bits")]
    SelectOutOfRange {
        /// Requested 0-based set-bit rank.
        rank: usize,
        /// Total number of set bits.
        ones: usize,
    },
    /// A value cannot be represented by the codec.
    #[error("value {value} cannot be encoded without overflow")]
    ValueOverflow {
        /// The offending value.
        value: u64,
    },
    /// `read_bits` asked for more than 64 bits at once.
    #[error("cannot read {width} bits into a u64")]
    WidthTooLarge {
        /// Requested width in bits.
        width: u32,
    },
    /// Serialized data violates a structural invariant.
    #[error("invalid encoded data: {0}")]
    InvalidEncoding(String),
}

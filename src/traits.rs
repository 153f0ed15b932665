//! Codec interface shared by all sorted-sequence encodings.

use crate::error::CompressionError;

/// Baseline cost of an uncompressed element.
pub const RAW_BITS_PER_ELEMENT: usize = 64;

/// An encoded, immutable representation of a non-decreasing `u64` sequence.
///
/// Implementations own their buffers and perform no mutation after
/// [`encode`](SortedCodec::encode) returns, so shared references can be
/// queried from multiple threads.
pub trait SortedCodec: Send + Sync {
    /// Encode a non-decreasing sequence.
    ///
    /// # Errors
    ///
    /// [`CompressionError::InvalidInputOrder`] if some `values[i] < values[i - 1]`.
    fn encode(values: &[u64]) -> Result<Self, CompressionError>
    where
        Self: Sized;

    /// Short human-readable codec name.
    fn name(&self) -> &'static str;

    /// Number of encoded elements.
    fn len(&self) -> usize;

    /// True if nothing was encoded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the full sequence in original order.
    fn decode(&self) -> Result<Vec<u64>, CompressionError>;

    /// Retrieve the element at `index`.
    ///
    /// # Errors
    ///
    /// [`CompressionError::IndexOutOfRange`] if `index >= self.len()`.
    fn access(&self, index: usize) -> Result<u64, CompressionError>;

    /// Total storage cost of the representation in bits.
    fn size_in_bits(&self) -> usize;

    /// Average encoded bits per element (0 for an empty sequence).
    fn bits_per_element(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.size_in_bits() as f64 / self.len() as f64
    }

    /// Encoded size relative to 64 bits per element (0 for an empty sequence).
    fn compression_ratio(&self) -> f64 {
        self.bits_per_element() / RAW_BITS_PER_ELEMENT as f64
    }
}

/// Check that `values` is non-decreasing.
pub(crate) fn validate_non_decreasing(values: &[u64]) -> Result<(), CompressionError> {
    for (i, pair) in values.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(CompressionError::InvalidInputOrder {
                index: i + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

/// Range check shared by the codecs' `access`.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), CompressionError> {
    if index >= len {
        return Err(CompressionError::IndexOutOfRange { index, len });
    }
    Ok(())
}

//! Succinct encodings for sorted integer sequences.
//!
//! `sortpack` compresses non-decreasing sequences of `u64` (posting lists,
//! sorted ID sets, bitmap positions) into bit-exact representations:
//!
//! - **Elias-Fano**: explicit low bits plus unary high bits in a rank/select
//!   bit vector. Random access to any element without decompression.
//! - **Golomb-Rice delta**: gap coding with a Golomb code tuned to the mean
//!   gap. Smaller on average, but only sequential access.
//!
//! Both sit behind the [`SortedCodec`] trait, and [`CompressionMethod`]
//! picks one at runtime.
//!
//! # Historical Context
//!
//! Elias (1974) and Fano (1971) independently described the high/low split
//! that gives monotone sequences close to `n * (2 + log(u/n))` bits with
//! constant-time access. Golomb (1966) introduced the parameterized
//! unary/binary code for geometrically distributed integers; Rice (1979)
//! studied the power-of-two special case. Gap coding with Golomb codes was
//! the standard inverted-index compression for decades.
//!
//! # Example
//!
//! ```rust
//! use sortpack::{EliasFano, GolombRiceDelta, SortedCodec};
//!
//! let ids = vec![3u64, 5, 9, 20];
//!
//! let ef = EliasFano::encode(&ids).unwrap();
//! assert_eq!(ef.access(2).unwrap(), 9);
//!
//! let gr = GolombRiceDelta::encode(&ids).unwrap();
//! assert_eq!(gr.modulus(), 6);
//! assert_eq!(gr.decode().unwrap(), ids);
//! ```
//!
//! # References
//!
//! - Elias, P. (1974). "Efficient storage and retrieval by content and address"
//! - Fano, R. (1971). "On the number of bits required to implement an associative memory"
//! - Golomb, S. (1966). "Run-length encodings"
//! - Jacobson, G. (1989). "Space-efficient static trees and graphs"

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bitvec;
mod elias_fano;
mod error;
mod golomb;
mod traits;

use std::fmt;
use std::str::FromStr;

pub use bitvec::{BitBuilder, BitVector};
pub use elias_fano::EliasFano;
pub use error::CompressionError;
pub use golomb::GolombRiceDelta;
pub use traits::{SortedCodec, RAW_BITS_PER_ELEMENT};

/// Codec selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Elias-Fano encoding (random access).
    #[default]
    EliasFano,
    /// Golomb-Rice coded gaps (sequential access).
    GolombRice,
}

impl CompressionMethod {
    /// Every available method.
    pub fn all() -> [CompressionMethod; 2] {
        [CompressionMethod::EliasFano, CompressionMethod::GolombRice]
    }

    /// Name matching [`SortedCodec::name`] of the encoded form.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::EliasFano => "EliasFano",
            CompressionMethod::GolombRice => "GolombRice",
        }
    }

    /// Encode `values` with this method.
    pub fn encode(&self, values: &[u64]) -> Result<Box<dyn SortedCodec>, CompressionError> {
        Ok(match self {
            CompressionMethod::EliasFano => Box::new(EliasFano::encode(values)?),
            CompressionMethod::GolombRice => Box::new(GolombRiceDelta::encode(values)?),
        })
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "eliasfano" | "ef" => Ok(CompressionMethod::EliasFano),
            "golombrice" | "golomb" | "gr" => Ok(CompressionMethod::GolombRice),
            other => Err(format!("unknown compression method: {other}")),
        }
    }
}

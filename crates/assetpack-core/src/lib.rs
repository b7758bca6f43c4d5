//! # Assetpack Core
//!
//! Core traits, error types and statistics shared by the assetpack codecs.
//!
//! The packaging tool only needs a `compress(bytes) -> bytes` and a
//! `decompress(bytes) -> bytes` contract from a codec; this crate defines
//! that contract and the error vocabulary codecs report through.
//!
//! ## Core Traits
//!
//! - [`Compressor`] - One-shot compression operations
//! - [`Decompressor`] - One-shot decompression operations
//! - [`Codec`] - Combined compress/decompress capability
//!
//! ## Example
//!
//! ```ignore
//! use assetpack_core::Codec;
//! use assetpack_lz4::Lz4Codec;
//!
//! let codec = Lz4Codec::new();
//! assert!(codec.verify_roundtrip(data)?);
//! ```

pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use stats::CompressionStats;
pub use traits::{Codec, Compressor, Decompressor};
pub use types::CompressionRatio;

//! # Assetpack LZ4
//!
//! LZ4 frame compression for packaged assets.
//!
//! Produces and consumes standard LZ4 frames (magic `0x184D2204`), so
//! output interoperates with the reference `lz4` tool and other
//! conforming libraries.
//!
//! ## Features
//!
//! - **Block codec**: single-probe hash match finder and an overlap-safe decoder
//! - **Frame codec**: all four block size classes, optional content size,
//!   block and content checksums
//! - **Bounds**: exact worst-case frame size and header-only output bounds
//! - **Safety**: every read and back-reference is bounds-checked; malformed
//!   input yields an error, never a panic
//!
//! ## Example
//!
//! ```ignore
//! let frame = assetpack_lz4::compress(data)?;
//! assert!(frame.len() <= assetpack_lz4::compress_bound(data.len()));
//! let restored = assetpack_lz4::decompress(&frame, None)?;
//! ```

pub mod block;
pub mod codec;
pub mod compress;
pub mod config;
pub mod decompress;
pub mod frame;
pub mod hash;

use assetpack_core::Result;

// Re-export main types
pub use codec::Lz4Codec;
pub use compress::Lz4Compressor;
pub use config::{ChecksumPolicy, CodecConfig, DecoderConfig, FrameConfig};
pub use decompress::Lz4Decompressor;
pub use frame::{
    compress_bound, decompress_bound, BlockSize, DecodedFrame, FrameDecoder, FrameEncoder,
    FrameHeader, FrameSummary, IntegrityWarning,
};

/// Compress `input` into a single frame with default settings.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    FrameEncoder::new().encode(input)
}

/// Decompress a single frame.
///
/// `max_size` caps the output when the frame does not declare its size.
pub fn decompress(input: &[u8], max_size: Option<usize>) -> Result<Vec<u8>> {
    FrameDecoder::new()
        .decode(input, max_size)
        .map(|frame| frame.data)
}

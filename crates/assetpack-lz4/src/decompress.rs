//! LZ4 frame decompressor.

use assetpack_core::{Decompressor, Result};

use crate::config::DecoderConfig;
use crate::frame::{DecodedFrame, FrameDecoder};

/// LZ4 decompressor for complete frames.
#[derive(Debug, Clone, Default)]
pub struct Lz4Decompressor {
    decoder: FrameDecoder,
}

impl Lz4Decompressor {
    /// Create a new LZ4 decompressor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: FrameDecoder::with_config(config),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        self.decoder.config()
    }

    /// Decompress and return the frame summary with the content.
    pub fn decompress_frame(&self, input: &[u8], max_size: Option<usize>) -> Result<DecodedFrame> {
        self.decoder.decode(input, max_size)
    }
}

impl Decompressor for Lz4Decompressor {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.decoder.decode(input, None).map(|frame| frame.data)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.decoder
            .decode_into(input, output)
            .map(|summary| summary.bytes_written)
    }

    /// `output_size` caps the output; a declared content size still wins
    /// when it fits.
    fn decompress_with_size(&self, input: &[u8], output_size: usize) -> Result<Vec<u8>> {
        self.decoder
            .decode(input, Some(output_size))
            .map(|frame| frame.data)
    }
}

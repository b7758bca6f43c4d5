//! LZ4 codec (combined compressor + decompressor).

use assetpack_core::{Codec, CompressionStats, Compressor, Decompressor, Result};

use crate::compress::Lz4Compressor;
use crate::config::CodecConfig;
use crate::decompress::Lz4Decompressor;

/// LZ4 codec combining compression and decompression.
#[derive(Debug, Clone, Default)]
pub struct Lz4Codec {
    compressor: Lz4Compressor,
    decompressor: Lz4Decompressor,
}

impl Lz4Codec {
    /// Create a new LZ4 codec with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec from a combined configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            compressor: Lz4Compressor::with_config(config.frame),
            decompressor: Lz4Decompressor::with_config(config.decoder),
        }
    }

    pub fn compressor(&self) -> &Lz4Compressor {
        &self.compressor
    }

    pub fn decompressor(&self) -> &Lz4Decompressor {
        &self.decompressor
    }

    /// Compress and return block statistics.
    pub fn compress_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
        self.compressor.compress_with_stats(input)
    }

    /// Decompress with a cap on the output size.
    pub fn decompress_sized(&self, input: &[u8], max_size: usize) -> Result<Vec<u8>> {
        self.decompressor.decompress_with_size(input, max_size)
    }
}

impl Compressor for Lz4Codec {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.compressor.compress(input)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.compressor.compress_to(input, output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        self.compressor.max_compressed_size(input_len)
    }
}

impl Decompressor for Lz4Codec {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.decompressor.decompress(input)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.decompressor.decompress_to(input, output)
    }

    fn decompress_with_size(&self, input: &[u8], output_size: usize) -> Result<Vec<u8>> {
        self.decompressor.decompress_with_size(input, output_size)
    }
}

impl Codec for Lz4Codec {}

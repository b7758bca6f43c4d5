//! LZ4 frame compressor.

use assetpack_core::{CompressionStats, Compressor, Result};

use crate::config::FrameConfig;
use crate::frame::FrameEncoder;

/// LZ4 compressor producing complete frames.
#[derive(Debug, Clone, Default)]
pub struct Lz4Compressor {
    encoder: FrameEncoder,
}

impl Lz4Compressor {
    /// Create a new LZ4 compressor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compressor writing frames with `config`.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            encoder: FrameEncoder::with_config(config),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        self.encoder.config()
    }

    /// Compress and return block statistics for the call.
    pub fn compress_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
        self.encoder.encode_with_stats(input)
    }
}

impl Compressor for Lz4Compressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.encoder.encode(input)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.encoder.encode_into(input, output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        self.encoder.max_frame_size(input_len)
    }
}

//! Frame encoder.

use std::time::Instant;

use assetpack_core::{CompressionStats, Result};
use tracing::{debug, trace};

use super::checksum::{block_checksum, content_checksum};
use super::{put_bytes, BlockHeader, FrameHeader};
use crate::block::{compress_block_with, max_compressed_size};
use crate::config::FrameConfig;
use crate::hash::HashTable;

/// Encodes a byte buffer as a single LZ4 frame.
///
/// The input is cut into blocks of the configured size class and each
/// block is compressed independently. A block that does not shrink is
/// stored raw, so output never exceeds
/// [`FrameConfig::max_frame_size`].
///
/// All working state is allocated per call.
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder {
    config: FrameConfig,
}

impl FrameEncoder {
    /// Encoder with the default frame configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Worst-case frame size for `input_len` bytes under this config.
    pub fn max_frame_size(&self, input_len: usize) -> usize {
        self.config.max_frame_size(input_len)
    }

    /// Encode `input` into a new frame.
    pub fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.encode_with_stats(input).map(|(frame, _)| frame)
    }

    /// Encode `input` and report block statistics.
    pub fn encode_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
        let mut output = vec![0u8; self.max_frame_size(input.len())];
        let stats = self.encode_frame(input, &mut output)?;
        output.truncate(stats.compressed_size);
        Ok((output, stats))
    }

    /// Encode into a caller-provided buffer, returning bytes written.
    ///
    /// Fails with `BufferTooSmall` if the frame does not fit.
    pub fn encode_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.encode_frame(input, output)
            .map(|stats| stats.compressed_size)
    }

    fn encode_frame(&self, input: &[u8], output: &mut [u8]) -> Result<CompressionStats> {
        let start = Instant::now();
        let block_size = self.config.block_size.bytes();

        let header = FrameHeader::new(&self.config, input.len());
        let mut pos = header.write(output)?;

        let mut table = HashTable::new();
        let mut scratch = vec![0u8; max_compressed_size(block_size.min(input.len()))];
        let mut stats = CompressionStats::new();
        stats.original_size = input.len();

        for (index, chunk) in input.chunks(block_size).enumerate() {
            let compressed_len = compress_block_with(chunk, &mut scratch, &mut table)?;
            let stored_raw = compressed_len >= chunk.len();
            let (block, payload) = if stored_raw {
                (BlockHeader::raw(chunk.len()), chunk)
            } else {
                (
                    BlockHeader::compressed(compressed_len),
                    &scratch[..compressed_len],
                )
            };

            pos = put_bytes(output, pos, &block.to_bytes())?;
            pos = put_bytes(output, pos, payload)?;
            if self.config.block_checksum {
                pos = put_bytes(output, pos, &block_checksum(payload).to_le_bytes())?;
            }

            trace!(
                block = index,
                input = chunk.len(),
                stored = payload.len(),
                raw = stored_raw,
                "encoded block"
            );
            stats.record_block(stored_raw);
        }

        pos = put_bytes(output, pos, &BlockHeader::end_mark().to_bytes())?;
        if self.config.content_checksum {
            pos = put_bytes(output, pos, &content_checksum(input).to_le_bytes())?;
        }

        stats.compressed_size = pos;
        stats.set_elapsed(start.elapsed());
        debug!(
            input = input.len(),
            output = pos,
            blocks = stats.blocks_processed,
            raw_blocks = stats.raw_blocks,
            "encoded frame"
        );
        Ok(stats)
    }
}

//! Frame decoder.
//!
//! Decoding walks the frame in stages:
//!
//! ```text
//! Header -> BlockSize -> Block -> BlockChecksum -> BlockSize -> ...
//!                     -> EndMark -> ContentChecksum -> Done
//! ```
//!
//! Back-references may reach into output from earlier blocks, so frames
//! written with linked blocks decode as well as independent ones.

use assetpack_core::{Error, Result};
use tracing::{debug, trace, warn};

use super::checksum::{block_checksum, content_checksum};
use super::{decompress_bound, read_u32_le, BlockHeader, BlockType, FrameHeader, CHECKSUM_SIZE};
use crate::block::decompress_block_at;
use crate::config::{ChecksumPolicy, DecoderConfig};

/// Non-fatal integrity problem found while decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityWarning {
    #[error("header checksum mismatch: stored 0x{stored:02x}, computed 0x{computed:02x}")]
    HeaderChecksum { stored: u8, computed: u8 },

    #[error("block {block} checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    BlockChecksum {
        block: usize,
        stored: u32,
        computed: u32,
    },

    #[error("content checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ContentChecksum { stored: u32, computed: u32 },

    #[error("{len} bytes of trailing data after frame end at offset {offset}")]
    TrailingData { offset: usize, len: usize },
}

/// What a decode call saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub header: FrameHeader,
    /// Frame bytes consumed, trailing data excluded.
    pub bytes_read: usize,
    pub bytes_written: usize,
    pub blocks: usize,
    pub raw_blocks: usize,
    pub warnings: Vec<IntegrityWarning>,
}

impl FrameSummary {
    fn new(header: FrameHeader) -> Self {
        Self {
            header,
            bytes_read: 0,
            bytes_written: 0,
            blocks: 0,
            raw_blocks: 0,
            warnings: Vec::new(),
        }
    }

    /// True when no integrity warnings were raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Decoded content plus its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub data: Vec<u8>,
    pub summary: FrameSummary,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    BlockSize,
    Block(BlockHeader),
    ContentChecksum,
    Done,
}

/// Decodes a single LZ4 frame from a byte buffer.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    config: DecoderConfig,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a frame into a newly allocated buffer.
    ///
    /// The buffer is sized from the declared content size, else from
    /// `max_size`, else from [`decompress_bound`]. A declared size larger
    /// than `max_size` fails with `BufferTooSmall`; any size above the
    /// configured ceiling fails with `OutputTooLarge`.
    pub fn decode(&self, input: &[u8], max_size: Option<usize>) -> Result<DecodedFrame> {
        let header = FrameHeader::parse(input)?;
        let capacity = self.output_capacity(input, &header, max_size)?;
        let mut data = allocate_output(capacity)?;

        let summary = self.decode_frame(input, header, &mut data)?;
        data.truncate(summary.bytes_written);
        Ok(DecodedFrame { data, summary })
    }

    /// Decode a frame into `output`.
    ///
    /// On error `output` is zero-filled so no partial content is exposed.
    pub fn decode_into(&self, input: &[u8], output: &mut [u8]) -> Result<FrameSummary> {
        let result =
            FrameHeader::parse(input).and_then(|header| self.decode_frame(input, header, output));
        if result.is_err() {
            output.fill(0);
        }
        result
    }

    /// Output buffer size for a decode of `input`.
    pub fn output_capacity(
        &self,
        input: &[u8],
        header: &FrameHeader,
        max_size: Option<usize>,
    ) -> Result<usize> {
        let requested = match (header.content_size, max_size) {
            (Some(declared), Some(max)) if declared > max as u64 => {
                return Err(Error::buffer_too_small(
                    usize::try_from(declared).unwrap_or(usize::MAX),
                    max,
                ));
            }
            (Some(declared), _) => declared,
            (None, Some(max)) => max as u64,
            (None, None) => decompress_bound(input)? as u64,
        };

        let limit = self.config.max_output_size;
        if requested > limit as u64 {
            return Err(Error::OutputTooLarge { requested, limit });
        }
        Ok(requested as usize)
    }

    fn decode_frame(
        &self,
        input: &[u8],
        header: FrameHeader,
        output: &mut [u8],
    ) -> Result<FrameSummary> {
        if let Some(declared) = header.content_size {
            if declared > output.len() as u64 {
                return Err(Error::buffer_too_small(
                    usize::try_from(declared).unwrap_or(usize::MAX),
                    output.len(),
                ));
            }
        }

        let descriptor = header.descriptor;
        let block_max = header.block_max_size();
        let mut pos = header.header_size;
        let mut written = 0usize;
        let mut summary = FrameSummary::new(header);

        if self.config.checksum_policy.verifies() {
            let stored = summary.header.header_checksum;
            let computed = summary.header.expected_checksum();
            if stored != computed {
                self.report(
                    &mut summary,
                    IntegrityWarning::HeaderChecksum { stored, computed },
                    Error::checksum_mismatch("header", stored as u32, computed as u32),
                )?;
            }
        }

        let mut stage = Stage::BlockSize;
        loop {
            stage = match stage {
                Stage::BlockSize => {
                    let block = BlockHeader::parse(input.get(pos..).unwrap_or_default())
                        .map_err(|_| Error::unexpected_eof(input.len()))?;
                    if !block.is_end_mark() && block.size > block_max {
                        return Err(Error::corrupted_at(
                            format!("block of {} bytes exceeds maximum {}", block.size, block_max),
                            pos,
                        ));
                    }
                    pos += BlockHeader::SIZE;
                    if block.is_end_mark() {
                        Stage::ContentChecksum
                    } else {
                        Stage::Block(block)
                    }
                }
                Stage::Block(block) => {
                    let end = pos + block.size;
                    let payload = input
                        .get(pos..end)
                        .ok_or_else(|| Error::unexpected_eof(input.len()))?;

                    let start = written;
                    written = match block.block_type {
                        BlockType::Raw => {
                            let block_end = written + payload.len();
                            if block_end > output.len() {
                                return Err(Error::buffer_too_small(block_end, output.len()));
                            }
                            output[written..block_end].copy_from_slice(payload);
                            block_end
                        }
                        _ => decompress_block_at(payload, output, written)?,
                    };
                    if written - start > block_max {
                        return Err(Error::corrupted_at(
                            format!(
                                "block decoded to {} bytes, maximum is {}",
                                written - start,
                                block_max
                            ),
                            pos,
                        ));
                    }
                    pos = end;

                    if descriptor.has_block_checksum() {
                        let stored = read_u32_le(input, pos)?;
                        pos += CHECKSUM_SIZE;
                        if self.config.checksum_policy.verifies() {
                            let computed = block_checksum(payload);
                            if stored != computed {
                                let warning = IntegrityWarning::BlockChecksum {
                                    block: summary.blocks,
                                    stored,
                                    computed,
                                };
                                self.report(
                                    &mut summary,
                                    warning,
                                    Error::checksum_mismatch("block", stored, computed),
                                )?;
                            }
                        }
                    }

                    trace!(
                        block = summary.blocks,
                        stored = payload.len(),
                        decoded = written - start,
                        raw = block.block_type == BlockType::Raw,
                        "decoded block"
                    );
                    summary.blocks += 1;
                    if block.block_type == BlockType::Raw {
                        summary.raw_blocks += 1;
                    }
                    Stage::BlockSize
                }
                Stage::ContentChecksum => {
                    if descriptor.has_content_checksum() {
                        let stored = read_u32_le(input, pos)?;
                        pos += CHECKSUM_SIZE;
                        if self.config.checksum_policy.verifies() {
                            let computed = content_checksum(&output[..written]);
                            if stored != computed {
                                self.report(
                                    &mut summary,
                                    IntegrityWarning::ContentChecksum { stored, computed },
                                    Error::checksum_mismatch("content", stored, computed),
                                )?;
                            }
                        }
                    }
                    Stage::Done
                }
                Stage::Done => break,
            };
        }

        if let Some(declared) = summary.header.content_size {
            if declared != written as u64 {
                return Err(Error::corrupted(format!(
                    "content size mismatch: header declares {} bytes, frame decoded to {}",
                    declared, written
                )));
            }
        }

        if pos < input.len() {
            let warning = IntegrityWarning::TrailingData {
                offset: pos,
                len: input.len() - pos,
            };
            warn!(%warning, "ignoring data after frame");
            summary.warnings.push(warning);
        }

        summary.bytes_read = pos;
        summary.bytes_written = written;
        debug!(
            input = pos,
            output = written,
            blocks = summary.blocks,
            warnings = summary.warnings.len(),
            "decoded frame"
        );
        Ok(summary)
    }

    /// Apply the checksum policy to a mismatch.
    fn report(
        &self,
        summary: &mut FrameSummary,
        warning: IntegrityWarning,
        error: Error,
    ) -> Result<()> {
        match self.config.checksum_policy {
            ChecksumPolicy::Strict => Err(error),
            ChecksumPolicy::Warn => {
                warn!(%warning, "integrity check failed");
                summary.warnings.push(warning);
                Ok(())
            }
            ChecksumPolicy::Ignore => Ok(()),
        }
    }
}

fn allocate_output(capacity: usize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    output
        .try_reserve_exact(capacity)
        .map_err(|_| Error::AllocationFailed {
            requested_bytes: capacity,
        })?;
    output.resize(capacity, 0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameConfig;
    use crate::frame::{BlockSize, FrameEncoder};

    fn checked_config() -> FrameConfig {
        FrameConfig::default()
            .with_block_size(BlockSize::Max64KiB)
            .with_content_size(true)
            .with_block_checksum(true)
            .with_content_checksum(true)
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8 ^ (i / 1000) as u8).collect()
    }

    #[test]
    fn test_decode_roundtrip() {
        let input = sample(150_000);
        let frame = FrameEncoder::with_config(checked_config())
            .encode(&input)
            .unwrap();
        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert_eq!(decoded.data, input);
        assert!(decoded.summary.is_clean());
        assert_eq!(decoded.summary.blocks, 3);
        assert_eq!(decoded.summary.bytes_read, frame.len());
        assert_eq!(decoded.summary.bytes_written, input.len());
    }

    #[test]
    fn test_decode_empty_frame() {
        let frame = FrameEncoder::new().encode(b"").unwrap();
        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert!(decoded.data.is_empty());
        assert_eq!(decoded.summary.blocks, 0);
    }

    #[test]
    fn test_hand_built_frame() {
        // Header (no options, 64 KiB), one compressed block: literal 'a'
        // then a 9-byte match at offset 1.
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18, 0x60, 0x40];
        frame.push(crate::frame::header_checksum(&[0x60, 0x40]));
        frame.extend_from_slice(&[4, 0, 0, 0, 0x15, b'a', 1, 0]);
        frame.extend_from_slice(&[0, 0, 0, 0]);
        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert_eq!(decoded.data, vec![b'a'; 10]);
    }

    #[test]
    fn test_block_checksum_policies() {
        let input = sample(1000);
        let mut frame = FrameEncoder::with_config(checked_config())
            .encode(&input)
            .unwrap();
        let stored = 15 + 4 + BlockHeader::parse(&frame[15..]).unwrap().size;
        frame[stored] ^= 0x01;

        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert_eq!(decoded.data, input);
        assert!(matches!(
            decoded.summary.warnings[..],
            [IntegrityWarning::BlockChecksum { block: 0, .. }]
        ));

        let err = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&frame, None)
            .unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { what: "block", .. }));

        let ignore = DecoderConfig::default().with_checksum_policy(ChecksumPolicy::Ignore);
        let decoded = FrameDecoder::with_config(ignore).decode(&frame, None).unwrap();
        assert!(decoded.summary.is_clean());
    }

    #[test]
    fn test_content_checksum_mismatch() {
        let input = sample(500);
        let mut frame = FrameEncoder::with_config(checked_config())
            .encode(&input)
            .unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert!(matches!(
            decoded.summary.warnings[..],
            [IntegrityWarning::ContentChecksum { .. }]
        ));
        let err = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&frame, None)
            .unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { what: "content", .. }));
    }

    #[test]
    fn test_header_checksum_mismatch() {
        let mut frame = FrameEncoder::new().encode(b"hello").unwrap();
        frame[6] ^= 0x55;
        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert_eq!(decoded.data, b"hello");
        assert!(matches!(
            decoded.summary.warnings[..],
            [IntegrityWarning::HeaderChecksum { .. }]
        ));
        let err = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&frame, None)
            .unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { what: "header", .. }));
    }

    #[test]
    fn test_reserved_bd_bits_pass_header_check() {
        let descriptor = [0x60, 0x41];
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18];
        frame.extend_from_slice(&descriptor);
        frame.push(crate::frame::header_checksum(&descriptor));
        frame.extend_from_slice(&BlockHeader::raw(3).to_bytes());
        frame.extend_from_slice(b"bd!");
        frame.extend_from_slice(&[0, 0, 0, 0]);

        let decoded = FrameDecoder::new().decode(&frame, None).unwrap();
        assert_eq!(decoded.data, b"bd!");
        assert!(decoded.summary.is_clean());

        let decoded = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&frame, None)
            .unwrap();
        assert_eq!(decoded.data, b"bd!");
    }

    #[test]
    fn test_compressed_block_expanding_past_class() {
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18, 0x60, 0x40];
        frame.push(crate::frame::header_checksum(&[0x60, 0x40]));
        frame.extend_from_slice(&BlockHeader::raw(1).to_bytes());
        frame.push(b'z');

        // No literals, then a 70000-byte match at offset 1.
        let mut block = vec![0x0F, 0x01, 0x00];
        let mut remaining = 70_000 - 4 - 15;
        while remaining >= 255 {
            block.push(255);
            remaining -= 255;
        }
        block.push(remaining as u8);
        frame.extend_from_slice(&BlockHeader::compressed(block.len()).to_bytes());
        frame.extend_from_slice(&block);
        frame.extend_from_slice(&[0, 0, 0, 0]);

        let err = FrameDecoder::new().decode(&frame, Some(200_000)).unwrap_err();
        assert!(matches!(err, Error::CorruptedData { .. }), "{:?}", err);
        assert!(err.is_format_error());
    }

    #[test]
    fn test_trailing_data_warns() {
        let mut frame = FrameEncoder::new().encode(b"payload").unwrap();
        let frame_len = frame.len();
        frame.extend_from_slice(b"junk");
        let decoded = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&frame, Some(64))
            .unwrap();
        assert_eq!(decoded.data, b"payload");
        assert_eq!(decoded.summary.bytes_read, frame_len);
        assert_eq!(
            decoded.summary.warnings,
            vec![IntegrityWarning::TrailingData {
                offset: frame_len,
                len: 4
            }]
        );
    }

    #[test]
    fn test_truncated_frame() {
        let frame = FrameEncoder::with_config(checked_config())
            .encode(&sample(3000))
            .unwrap();
        for len in [0, 3, 7, 15, 18, 30, frame.len() - 5, frame.len() - 1] {
            let err = FrameDecoder::new().decode(&frame[..len], Some(3000)).unwrap_err();
            assert!(
                matches!(err, Error::UnexpectedEof { .. }),
                "len {}: {:?}",
                len,
                err
            );
        }
    }

    #[test]
    fn test_oversized_block_rejected() {
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18, 0x60, 0x40];
        frame.push(crate::frame::header_checksum(&[0x60, 0x40]));
        frame.extend_from_slice(&(65537u32 | 0x8000_0000).to_le_bytes());
        frame.extend(std::iter::repeat(0u8).take(65537));
        frame.extend_from_slice(&[0, 0, 0, 0]);
        let err = FrameDecoder::new().decode(&frame, None).unwrap_err();
        assert!(matches!(err, Error::CorruptedData { .. }));
    }

    #[test]
    fn test_declared_size_exceeds_max() {
        let config = FrameConfig::default().with_content_size(true);
        let frame = FrameEncoder::with_config(config).encode(&[1u8; 100]).unwrap();
        let err = FrameDecoder::new().decode(&frame, Some(50)).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 100,
                provided: 50
            }
        ));
    }

    #[test]
    fn test_max_size_too_small_without_declared_size() {
        let frame = FrameEncoder::new().encode(&[1u8; 100]).unwrap();
        let err = FrameDecoder::new().decode(&frame, Some(50)).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));
    }

    #[test]
    fn test_content_size_mismatch() {
        let config = FrameConfig::default().with_content_size(true);
        let frame = FrameEncoder::with_config(config).encode(b"abcdef").unwrap();
        // Declare one byte more than the frame holds and fix the header checksum.
        let mut forged = frame.clone();
        forged[6..14].copy_from_slice(&7u64.to_le_bytes());
        forged[14] = crate::frame::header_checksum(&forged[4..14]);
        let err = FrameDecoder::with_config(DecoderConfig::strict())
            .decode(&forged, None)
            .unwrap_err();
        assert!(matches!(err, Error::CorruptedData { .. }));
    }

    #[test]
    fn test_output_ceiling() {
        let config = FrameConfig::default().with_content_size(true);
        let frame = FrameEncoder::with_config(config).encode(&[0u8; 4096]).unwrap();
        let decoder = FrameDecoder::with_config(DecoderConfig::default().with_max_output_size(1024));
        let err = decoder.decode(&frame, None).unwrap_err();
        assert!(matches!(
            err,
            Error::OutputTooLarge {
                requested: 4096,
                limit: 1024
            }
        ));
    }

    #[test]
    fn test_decode_into_zeroes_on_error() {
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18, 0x60, 0x40];
        frame.push(crate::frame::header_checksum(&[0x60, 0x40]));
        // Literal "abc" then a match at offset 0.
        frame.extend_from_slice(&[6, 0, 0, 0, 0x30, b'a', b'b', b'c', 0, 0]);
        frame.extend_from_slice(&[0, 0, 0, 0]);

        let mut output = [0xAAu8; 32];
        let err = FrameDecoder::new().decode_into(&frame, &mut output).unwrap_err();
        assert!(matches!(err, Error::InvalidOffset { offset: 0, .. }));
        assert!(output.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_into() {
        let frame = FrameEncoder::new().encode(b"into a buffer").unwrap();
        let mut output = [0u8; 64];
        let summary = FrameDecoder::new().decode_into(&frame, &mut output).unwrap();
        assert_eq!(&output[..summary.bytes_written], b"into a buffer");
    }
}

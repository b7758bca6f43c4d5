//! Output size bounds.

use assetpack_core::{Error, Result};

use super::{BlockHeader, BlockType, FrameHeader, CHECKSUM_SIZE};

/// Upper bound on the encoded size of `input_len` bytes.
///
/// Holds for frames written with the default [`FrameConfig`](crate::FrameConfig).
/// Use [`FrameConfig::max_frame_size`](crate::FrameConfig::max_frame_size)
/// for other configurations.
pub fn compress_bound(input_len: usize) -> usize {
    input_len + input_len / 255 + 16
}

/// Upper bound on the decoded size of a frame.
///
/// Returns the declared content size when the header carries one.
/// Otherwise walks the block headers without decoding anything: raw
/// blocks count their stored size, compressed blocks count the block
/// size class.
pub fn decompress_bound(input: &[u8]) -> Result<usize> {
    let header = FrameHeader::parse(input)?;
    if let Some(size) = header.content_size {
        return usize::try_from(size).map_err(|_| Error::OutputTooLarge {
            requested: size,
            limit: usize::MAX,
        });
    }

    let block_max = header.block_max_size();
    let checksum_len = if header.descriptor.has_block_checksum() {
        CHECKSUM_SIZE
    } else {
        0
    };

    let mut pos = header.header_size;
    let mut bound = 0usize;
    loop {
        let block = BlockHeader::parse(input.get(pos..).unwrap_or_default())
            .map_err(|_| Error::unexpected_eof(input.len()))?;
        pos += BlockHeader::SIZE;

        let contribution = match block.block_type {
            BlockType::EndMark => break,
            _ if block.size > block_max => {
                return Err(Error::corrupted_at(
                    format!("block of {} bytes exceeds maximum {}", block.size, block_max),
                    pos - BlockHeader::SIZE,
                ));
            }
            BlockType::Raw => block.size,
            BlockType::Compressed => block_max,
        };
        bound = bound.checked_add(contribution).ok_or(Error::OutputTooLarge {
            requested: u64::MAX,
            limit: usize::MAX,
        })?;

        pos += block.size + checksum_len;
        if pos > input.len() {
            return Err(Error::unexpected_eof(input.len()));
        }
    }

    Ok(bound)
}

//! Frame data block headers.
//!
//! Each data block starts with a 4-byte little-endian size word. The
//! high bit marks a block stored uncompressed; a zero word is the end mark.

use assetpack_core::{Error, Result};

/// High bit of the block size word.
pub const BLOCK_RAW_FLAG: u32 = 0x8000_0000;

/// Kind of a frame block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// LZ4 compressed block payload.
    Compressed,
    /// Payload stored verbatim.
    Raw,
    /// End of the block sequence.
    EndMark,
}

/// Parsed block size word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_type: BlockType,
    /// Stored payload size in bytes.
    pub size: usize,
}

impl BlockHeader {
    /// Size of the block size word.
    pub const SIZE: usize = 4;

    pub fn compressed(size: usize) -> Self {
        Self {
            block_type: BlockType::Compressed,
            size,
        }
    }

    pub fn raw(size: usize) -> Self {
        Self {
            block_type: BlockType::Raw,
            size,
        }
    }

    pub fn end_mark() -> Self {
        Self {
            block_type: BlockType::EndMark,
            size: 0,
        }
    }

    /// Parse a block header from the first 4 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::unexpected_eof(data.len()));
        }
        let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if word == 0 {
            return Ok(Self::end_mark());
        }

        let size = (word & !BLOCK_RAW_FLAG) as usize;
        if word & BLOCK_RAW_FLAG != 0 {
            Ok(Self::raw(size))
        } else {
            Ok(Self::compressed(size))
        }
    }

    /// Serialize to the 4-byte size word.
    pub fn to_bytes(&self) -> [u8; 4] {
        let word = match self.block_type {
            BlockType::Compressed => self.size as u32,
            BlockType::Raw => self.size as u32 | BLOCK_RAW_FLAG,
            BlockType::EndMark => 0,
        };
        word.to_le_bytes()
    }

    pub fn is_end_mark(&self) -> bool {
        self.block_type == BlockType::EndMark
    }
}

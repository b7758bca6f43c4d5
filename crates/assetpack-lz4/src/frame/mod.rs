//! LZ4 frame format.
//!
//! ## Frame Structure
//!
//! ```text
//! +-------------------+
//! | Magic_Number      | 4 bytes (0x184D2204)
//! +-------------------+
//! | FLG, BD           | 2 bytes
//! | Content_Size      | 0 or 8 bytes
//! | Header_Checksum   | 1 byte
//! +-------------------+
//! | Data_Block(s)     | 4-byte size, payload, 0 or 4 byte checksum
//! +-------------------+
//! | End_Mark          | 4 bytes (0x00000000)
//! +-------------------+
//! | Content_Checksum  | 0 or 4 bytes
//! +-------------------+
//! ```
//!
//! ## References
//!
//! - [LZ4 Frame Format Description](https://github.com/lz4/lz4/blob/dev/doc/lz4_Frame_format.md)

mod block;
mod bound;
mod checksum;
mod decoder;
mod encoder;
mod header;

use std::fmt;
use std::str::FromStr;

use assetpack_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub use block::{BlockHeader, BlockType};
pub use bound::{compress_bound, decompress_bound};
pub use checksum::{content_checksum, header_checksum};
pub use decoder::{DecodedFrame, FrameDecoder, FrameSummary, IntegrityWarning};
pub use encoder::FrameEncoder;
pub use header::{FrameDescriptor, FrameHeader};

/// LZ4 frame magic number (stored little-endian).
pub const LZ4_MAGIC: u32 = 0x184D2204;

/// FLG version field value (`01` in bits 7-6).
pub const FLG_VERSION: u8 = 0x40;
/// Mask selecting the FLG version bits.
pub const FLG_VERSION_MASK: u8 = 0xC0;
/// Blocks do not reference earlier blocks.
pub const FLG_BLOCK_INDEPENDENCE: u8 = 0x20;
/// Each block is followed by an XXH32 checksum.
pub const FLG_BLOCK_CHECKSUM: u8 = 0x10;
/// An 8-byte content size follows the BD byte.
pub const FLG_CONTENT_SIZE: u8 = 0x08;
/// An XXH32 of the decoded content follows the end mark.
pub const FLG_CONTENT_CHECKSUM: u8 = 0x04;
/// A 4-byte dictionary id follows the content size.
pub const FLG_DICTIONARY_ID: u8 = 0x01;

/// Size of the optional block and content checksums.
pub const CHECKSUM_SIZE: usize = 4;

/// Size of the end mark.
pub const END_MARK_SIZE: usize = 4;

/// Smallest header: magic, FLG, BD, checksum.
pub const MIN_HEADER_SIZE: usize = 7;

/// Largest header this codec reads or writes (with content size).
pub const MAX_HEADER_SIZE: usize = MIN_HEADER_SIZE + 8;

/// Maximum block size class, stored in bits 6-4 of the BD byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockSize {
    /// 64 KiB blocks.
    #[serde(rename = "64KiB")]
    Max64KiB,
    /// 256 KiB blocks.
    #[serde(rename = "256KiB")]
    Max256KiB,
    /// 1 MiB blocks.
    #[serde(rename = "1MiB")]
    Max1MiB,
    /// 4 MiB blocks.
    #[default]
    #[serde(rename = "4MiB")]
    Max4MiB,
}

impl BlockSize {
    /// Map a block-size indicator (4-7) to its class.
    pub fn from_indicator(indicator: u8) -> Option<Self> {
        match indicator {
            4 => Some(BlockSize::Max64KiB),
            5 => Some(BlockSize::Max256KiB),
            6 => Some(BlockSize::Max1MiB),
            7 => Some(BlockSize::Max4MiB),
            _ => None,
        }
    }

    /// Parse the BD byte.
    pub fn from_bd(bd: u8) -> Result<Self> {
        let indicator = (bd >> 4) & 0x07;
        Self::from_indicator(indicator).ok_or(Error::InvalidBlockSize { indicator })
    }

    /// The block-size indicator stored in the header.
    pub fn indicator(self) -> u8 {
        match self {
            BlockSize::Max64KiB => 4,
            BlockSize::Max256KiB => 5,
            BlockSize::Max1MiB => 6,
            BlockSize::Max4MiB => 7,
        }
    }

    /// The BD byte for this class.
    pub fn bd(self) -> u8 {
        self.indicator() << 4
    }

    /// Maximum block size in bytes.
    pub fn bytes(self) -> usize {
        match self {
            BlockSize::Max64KiB => 64 * 1024,
            BlockSize::Max256KiB => 256 * 1024,
            BlockSize::Max1MiB => 1024 * 1024,
            BlockSize::Max4MiB => 4 * 1024 * 1024,
        }
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockSize::Max64KiB => "64KiB",
            BlockSize::Max256KiB => "256KiB",
            BlockSize::Max1MiB => "1MiB",
            BlockSize::Max4MiB => "4MiB",
        };
        f.write_str(name)
    }
}

impl FromStr for BlockSize {
    type Err = Error;

    /// Accepts `64k`, `256KiB`, `1m`, `4MiB`, or a raw indicator `4`-`7`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "64k" | "64kb" | "64kib" | "4" => Ok(BlockSize::Max64KiB),
            "256k" | "256kb" | "256kib" | "5" => Ok(BlockSize::Max256KiB),
            "1m" | "1mb" | "1mib" | "6" => Ok(BlockSize::Max1MiB),
            "4m" | "4mb" | "4mib" | "7" => Ok(BlockSize::Max4MiB),
            other => Err(Error::InvalidConfig(format!("unknown block size '{}'", other))),
        }
    }
}

/// Read a little-endian u32 at `pos`.
pub(crate) fn read_u32_le(input: &[u8], pos: usize) -> Result<u32> {
    input
        .get(pos..pos + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::unexpected_eof(input.len()))
}

/// Read a little-endian u64 at `pos`.
pub(crate) fn read_u64_le(input: &[u8], pos: usize) -> Result<u64> {
    let bytes = input
        .get(pos..pos + 8)
        .ok_or_else(|| Error::unexpected_eof(input.len()))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}

/// Copy `bytes` into `output` at `pos`, returning the new position.
pub(crate) fn put_bytes(output: &mut [u8], pos: usize, bytes: &[u8]) -> Result<usize> {
    let end = pos + bytes.len();
    if end > output.len() {
        return Err(Error::buffer_too_small(end, output.len()));
    }
    output[pos..end].copy_from_slice(bytes);
    Ok(end)
}

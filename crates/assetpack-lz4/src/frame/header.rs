//! Frame header parsing and serialization.

use assetpack_core::{Error, Result};

use super::checksum::header_checksum;
use super::{
    put_bytes, read_u32_le, read_u64_le, BlockSize, FLG_BLOCK_CHECKSUM, FLG_BLOCK_INDEPENDENCE,
    FLG_CONTENT_CHECKSUM, FLG_CONTENT_SIZE, FLG_DICTIONARY_ID, FLG_VERSION, FLG_VERSION_MASK,
    LZ4_MAGIC, MAX_HEADER_SIZE,
};
use crate::config::FrameConfig;

/// The FLG byte.
///
/// Reserved bit 1 is carried through but never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    flg: u8,
}

impl FrameDescriptor {
    /// Validate an FLG byte.
    pub fn parse(flg: u8) -> Result<Self> {
        if flg & FLG_VERSION_MASK != FLG_VERSION {
            return Err(Error::UnsupportedVersion {
                version: (flg & FLG_VERSION_MASK) >> 6,
            });
        }
        if flg & FLG_DICTIONARY_ID != 0 {
            return Err(Error::Unsupported(
                "frames with a dictionary id are not supported".into(),
            ));
        }
        Ok(Self { flg })
    }

    /// FLG byte for frames written with `config`.
    pub fn for_config(config: &FrameConfig) -> Self {
        let mut flg = FLG_VERSION | FLG_BLOCK_INDEPENDENCE;
        if config.block_checksum {
            flg |= FLG_BLOCK_CHECKSUM;
        }
        if config.content_size {
            flg |= FLG_CONTENT_SIZE;
        }
        if config.content_checksum {
            flg |= FLG_CONTENT_CHECKSUM;
        }
        Self { flg }
    }

    /// Raw FLG byte.
    pub fn raw(&self) -> u8 {
        self.flg
    }

    pub fn version(&self) -> u8 {
        (self.flg & FLG_VERSION_MASK) >> 6
    }

    pub fn block_independence(&self) -> bool {
        self.flg & FLG_BLOCK_INDEPENDENCE != 0
    }

    pub fn has_block_checksum(&self) -> bool {
        self.flg & FLG_BLOCK_CHECKSUM != 0
    }

    pub fn has_content_size(&self) -> bool {
        self.flg & FLG_CONTENT_SIZE != 0
    }

    pub fn has_content_checksum(&self) -> bool {
        self.flg & FLG_CONTENT_CHECKSUM != 0
    }
}

/// Parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub descriptor: FrameDescriptor,
    pub block_size: BlockSize,
    /// Declared decoded size, when the frame carries one.
    pub content_size: Option<u64>,
    /// Stored header checksum byte.
    pub header_checksum: u8,
    /// Checksum of the descriptor bytes as they appear in the frame.
    pub computed_checksum: u8,
    /// Header length in bytes, magic included.
    pub header_size: usize,
}

impl FrameHeader {
    /// Build the header for a frame of `content_len` bytes.
    pub fn new(config: &FrameConfig, content_len: usize) -> Self {
        let descriptor = FrameDescriptor::for_config(config);
        let content_size = config.content_size.then_some(content_len as u64);
        let mut header = Self {
            descriptor,
            block_size: config.block_size,
            content_size,
            header_checksum: 0,
            computed_checksum: 0,
            header_size: 0,
        };
        let (bytes, len) = header.descriptor_bytes();
        header.header_checksum = header_checksum(&bytes[..len]);
        header.computed_checksum = header.header_checksum;
        header.header_size = 4 + len + 1;
        header
    }

    /// Parse the header at the start of `input`.
    ///
    /// The header checksum is read but not verified; see
    /// [`FrameHeader::checksum_matches`].
    pub fn parse(input: &[u8]) -> Result<Self> {
        let magic = read_u32_le(input, 0)?;
        if magic != LZ4_MAGIC {
            return Err(Error::InvalidMagic {
                expected: LZ4_MAGIC,
                found: magic,
            });
        }

        let flg = *input.get(4).ok_or_else(|| Error::unexpected_eof(input.len()))?;
        let descriptor = FrameDescriptor::parse(flg)?;
        let bd = *input.get(5).ok_or_else(|| Error::unexpected_eof(input.len()))?;
        let block_size = BlockSize::from_bd(bd)?;

        let mut pos = 6;
        let content_size = if descriptor.has_content_size() {
            let size = read_u64_le(input, pos)?;
            pos += 8;
            Some(size)
        } else {
            None
        };

        let stored = *input
            .get(pos)
            .ok_or_else(|| Error::unexpected_eof(input.len()))?;

        // Reserved FLG/BD bits are covered by the checksum as stored.
        Ok(Self {
            descriptor,
            block_size,
            content_size,
            header_checksum: stored,
            computed_checksum: header_checksum(&input[4..pos]),
            header_size: pos + 1,
        })
    }

    /// Header checksum over the descriptor bytes.
    pub fn expected_checksum(&self) -> u8 {
        self.computed_checksum
    }

    pub fn checksum_matches(&self) -> bool {
        self.header_checksum == self.expected_checksum()
    }

    /// Maximum decoded size of one block.
    pub fn block_max_size(&self) -> usize {
        self.block_size.bytes()
    }

    /// Write the header to `output`, returning bytes written.
    ///
    /// Reserved bits are written as zero and the checksum is computed
    /// over the bytes written.
    pub fn write(&self, output: &mut [u8]) -> Result<usize> {
        let (bytes, len) = self.descriptor_bytes();
        let pos = put_bytes(output, 0, &LZ4_MAGIC.to_le_bytes())?;
        let pos = put_bytes(output, pos, &bytes[..len])?;
        put_bytes(output, pos, &[header_checksum(&bytes[..len])])
    }

    /// Serialize the header into a new vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; MAX_HEADER_SIZE];
        let len = self.write(&mut out).unwrap_or(0);
        out.truncate(len);
        out
    }

    /// FLG, BD and the optional content size, as covered by the checksum.
    fn descriptor_bytes(&self) -> ([u8; 10], usize) {
        let mut bytes = [0u8; 10];
        bytes[0] = self.descriptor.raw();
        bytes[1] = self.block_size.bd();
        match self.content_size {
            Some(size) if self.descriptor.has_content_size() => {
                bytes[2..10].copy_from_slice(&size.to_le_bytes());
                (bytes, 10)
            }
            _ => (bytes, 2),
        }
    }
}

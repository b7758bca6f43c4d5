//! Encoder and decoder configuration.
//!
//! Configuration is plain data with serde support so the packaging tool
//! can load it from JSON alongside its other settings.
//!
//! ```json
//! {
//!   "frame": { "block_size": "64KiB", "content_checksum": true },
//!   "decoder": { "checksum_policy": "strict" }
//! }
//! ```

use assetpack_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::frame::{BlockHeader, BlockSize, CHECKSUM_SIZE, END_MARK_SIZE, MIN_HEADER_SIZE};

/// Default ceiling on a single decode allocation (1 GiB).
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 1 << 30;

/// Options for frames produced by the encoder.
///
/// The default writes no content size and no checksums, which keeps every
/// frame within [`compress_bound`](crate::compress_bound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Maximum block size class.
    pub block_size: BlockSize,

    /// Store the input length in the header.
    pub content_size: bool,

    /// Append an XXH32 after every block.
    pub block_checksum: bool,

    /// Append an XXH32 of the input after the end mark.
    pub content_checksum: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            block_size: BlockSize::Max4MiB,
            content_size: false,
            block_checksum: false,
            content_checksum: false,
        }
    }
}

impl FrameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_content_size(mut self, enabled: bool) -> Self {
        self.content_size = enabled;
        self
    }

    pub fn with_block_checksum(mut self, enabled: bool) -> Self {
        self.block_checksum = enabled;
        self
    }

    pub fn with_content_checksum(mut self, enabled: bool) -> Self {
        self.content_checksum = enabled;
        self
    }

    /// Header length for frames written with this config.
    pub fn header_size(&self) -> usize {
        MIN_HEADER_SIZE + if self.content_size { 8 } else { 0 }
    }

    /// Exact worst-case frame size for `input_len` bytes.
    ///
    /// Blocks that do not shrink are stored raw, so each block costs at
    /// most its size word, its payload and its optional checksum.
    pub fn max_frame_size(&self, input_len: usize) -> usize {
        let blocks = input_len.div_ceil(self.block_size.bytes());
        let per_block = BlockHeader::SIZE + if self.block_checksum { CHECKSUM_SIZE } else { 0 };
        let trailer = END_MARK_SIZE + if self.content_checksum { CHECKSUM_SIZE } else { 0 };
        self.header_size() + blocks * per_block + input_len + trailer
    }
}

/// How the decoder treats checksum mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Skip checksum verification.
    Ignore,
    /// Verify and report mismatches as warnings.
    #[default]
    Warn,
    /// Verify and fail on any mismatch.
    Strict,
}

impl ChecksumPolicy {
    /// Whether checksums are computed at all.
    pub fn verifies(self) -> bool {
        !matches!(self, ChecksumPolicy::Ignore)
    }
}

/// Options for the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub checksum_policy: ChecksumPolicy,

    /// Largest output buffer a single decode may allocate.
    pub max_output_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            checksum_policy: ChecksumPolicy::Warn,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on any checksum mismatch.
    pub fn strict() -> Self {
        Self::default().with_checksum_policy(ChecksumPolicy::Strict)
    }

    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    pub fn with_max_output_size(mut self, limit: usize) -> Self {
        self.max_output_size = limit;
        self
    }
}

/// Combined encoder and decoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub frame: FrameConfig,
    pub decoder: DecoderConfig,
}

impl CodecConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("invalid codec config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.decoder.max_output_size == 0 {
            return Err(Error::InvalidConfig(
                "decoder.max_output_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

//! XXH32 checksums used by the frame format.
//!
//! All checksums use seed 0. The header checksum is the second byte of
//! the XXH32 of the descriptor (FLG through the last descriptor field).

use xxhash_rust::xxh32::xxh32;

/// Seed for every frame checksum.
pub const XXH32_SEED: u32 = 0;

/// One-byte header checksum over the descriptor bytes.
#[inline]
pub fn header_checksum(descriptor: &[u8]) -> u8 {
    ((xxh32(descriptor, XXH32_SEED) >> 8) & 0xFF) as u8
}

/// XXH32 over a stored block payload.
#[inline]
pub fn block_checksum(payload: &[u8]) -> u32 {
    xxh32(payload, XXH32_SEED)
}

/// XXH32 over the whole decoded content.
#[inline]
pub fn content_checksum(content: &[u8]) -> u32 {
    xxh32(content, XXH32_SEED)
}

//! Statistics for compression and decompression calls.

use std::time::Duration;

use crate::types::CompressionRatio;

/// Statistics from a single compression or decompression call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Original (uncompressed) size in bytes.
    pub original_size: usize,

    /// Compressed (framed) size in bytes.
    pub compressed_size: usize,

    /// Time taken in microseconds.
    pub time_us: u64,

    /// Number of data blocks processed.
    pub blocks_processed: usize,

    /// Number of those blocks that were stored without compression.
    pub raw_blocks: usize,
}

impl CompressionStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed block.
    pub fn record_block(&mut self, stored_raw: bool) {
        self.blocks_processed += 1;
        if stored_raw {
            self.raw_blocks += 1;
        }
    }

    /// Set the elapsed time.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Get compression ratio.
    pub fn ratio(&self) -> CompressionRatio {
        CompressionRatio::new(self.original_size, self.compressed_size)
    }

    /// Get throughput in MB/s over the uncompressed size.
    pub fn throughput_mbs(&self) -> f64 {
        if self.time_us == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.time_us as f64
    }

    /// Merge stats from another call.
    pub fn merge(&mut self, other: &CompressionStats) {
        self.original_size += other.original_size;
        self.compressed_size += other.compressed_size;
        self.time_us += other.time_us;
        self.blocks_processed += other.blocks_processed;
        self.raw_blocks += other.raw_blocks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_block() {
        let mut stats = CompressionStats::new();
        stats.record_block(false);
        stats.record_block(true);
        stats.record_block(true);
        assert_eq!(stats.blocks_processed, 3);
        assert_eq!(stats.raw_blocks, 2);
    }

    #[test]
    fn test_throughput() {
        let mut stats = CompressionStats {
            original_size: 2_000_000,
            ..Default::default()
        };
        assert_eq!(stats.throughput_mbs(), 0.0);
        stats.set_elapsed(Duration::from_secs(1));
        assert_eq!(stats.throughput_mbs(), 2.0);
    }

    #[test]
    fn test_merge() {
        let mut a = CompressionStats {
            original_size: 100,
            compressed_size: 40,
            time_us: 5,
            blocks_processed: 1,
            raw_blocks: 0,
        };
        let b = CompressionStats {
            original_size: 50,
            compressed_size: 54,
            time_us: 3,
            blocks_processed: 1,
            raw_blocks: 1,
        };
        a.merge(&b);
        assert_eq!(a.original_size, 150);
        assert_eq!(a.compressed_size, 94);
        assert_eq!(a.raw_blocks, 1);
        assert_eq!(a.ratio().bytes_saved(), 56);
    }
}

//! Match-finder hash table.
//!
//! Maps the hash of a 4-byte sequence to the most recent block position
//! where that sequence was seen. Entries are only candidates: the caller
//! must compare the actual bytes before emitting a match.

/// log2 of the number of table slots.
pub const HASH_LOG: u32 = 16;

/// Number of table slots (64K entries).
pub const HASH_TABLE_SIZE: usize = 1 << HASH_LOG;

/// Multiplicative hash of a 4-byte sequence.
#[inline(always)]
pub fn hash4(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - HASH_LOG)) as usize
}

/// Fixed-size table of last-seen positions.
///
/// Positions are block-relative, so `u32` covers every block-size class.
/// A fresh or reset table maps every hash to position 0.
#[derive(Clone)]
pub struct HashTable {
    slots: Box<[u32]>,
}

impl HashTable {
    /// Allocate an empty table.
    pub fn new() -> Self {
        Self {
            slots: vec![0u32; HASH_TABLE_SIZE].into_boxed_slice(),
        }
    }

    /// Forget every recorded position.
    pub fn reset(&mut self) {
        self.slots.fill(0);
    }

    /// Record `position` for `sequence`, returning the previous candidate.
    #[inline(always)]
    pub fn replace(&mut self, sequence: u32, position: usize) -> usize {
        let slot = &mut self.slots[hash4(sequence)];
        let previous = *slot as usize;
        *slot = position as u32;
        previous
    }

    /// Record `position` for `sequence`.
    #[inline(always)]
    pub fn insert(&mut self, sequence: u32, position: usize) {
        self.slots[hash4(sequence)] = position as u32;
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HashTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashTable")
            .field("slots", &self.slots.len())
            .finish()
    }
}

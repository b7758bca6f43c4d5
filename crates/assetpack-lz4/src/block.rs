//! LZ4 block format encoding and decoding.
//!
//! LZ4 block format is a sequence of:
//! - Token byte: (literal_length: 4 bits, match_length: 4 bits)
//! - Optional additional literal length bytes (if literal_length == 15)
//! - Literal bytes
//! - Match offset (2 bytes, little-endian)
//! - Optional additional match length bytes (if match_length == 15)
//!
//! The last sequence has no match (just literals).

use assetpack_core::{Error, Result};

use crate::hash::HashTable;

/// Minimum match length for LZ4 (matches must be at least 4 bytes).
pub const MIN_MATCH: usize = 4;

/// Largest back-reference distance a 16-bit offset can express.
pub const MAX_OFFSET: usize = 65535;

/// Saturated nibble value; lengths at or above it use extension bytes.
const RUN_MASK: usize = 15;

/// Number of bytes at end of a block that are always emitted as literals.
const LAST_LITERALS: usize = 5;

/// No match may start within this many bytes of the end of a block.
const MF_LIMIT: usize = 12;

/// Minimum input size to attempt compression.
const MIN_INPUT_SIZE: usize = MF_LIMIT + 1;

/// Scan step grows by one every `1 << SKIP_TRIGGER` consecutive misses.
const SKIP_TRIGGER: usize = 6;

/// Read 4 bytes as u32 (little-endian).
#[inline(always)]
fn read_u32_le(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Count matching bytes between two positions.
#[inline]
fn count_match(data: &[u8], mut pos1: usize, mut pos2: usize, limit: usize) -> usize {
    let start = pos2;
    while pos2 < limit && data[pos1] == data[pos2] {
        pos1 += 1;
        pos2 += 1;
    }
    pos2 - start
}

/// Number of extension bytes that follow a saturated nibble for `len`.
#[inline]
fn length_extension_size(len: usize) -> usize {
    if len >= RUN_MASK {
        (len - RUN_MASK) / 255 + 1
    } else {
        0
    }
}

/// Write the extension bytes for `len`, if its nibble saturates.
///
/// The caller has already checked that the bytes fit.
#[inline]
fn write_length(output: &mut [u8], mut pos: usize, len: usize) -> usize {
    if len < RUN_MASK {
        return pos;
    }
    let mut remaining = len - RUN_MASK;
    while remaining >= 255 {
        output[pos] = 255;
        pos += 1;
        remaining -= 255;
    }
    output[pos] = remaining as u8;
    pos + 1
}

/// Decode a literal or match length from its nibble `code`.
///
/// A saturated nibble is followed by bytes that each add their value;
/// the run continues while a byte equals 255.
#[inline]
fn read_length(input: &[u8], pos: &mut usize, code: usize) -> Result<usize> {
    let mut len = code;
    if code == RUN_MASK {
        loop {
            let byte = *input.get(*pos).ok_or_else(|| Error::unexpected_eof(*pos))?;
            *pos += 1;
            len = len
                .checked_add(byte as usize)
                .ok_or_else(|| Error::corrupted_at("length overflow", *pos))?;
            if byte != 255 {
                break;
            }
        }
    }
    Ok(len)
}

#[inline(always)]
fn token(literal_len: usize, match_code: usize) -> u8 {
    ((literal_len.min(RUN_MASK) << 4) | match_code.min(RUN_MASK)) as u8
}

/// Compress data using LZ4 block format.
///
/// Allocates a fresh hash table; see [`compress_block_with`] to reuse one.
/// Returns the number of bytes written to output.
pub fn compress_block(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let mut table = HashTable::new();
    compress_block_with(input, output, &mut table)
}

/// Compress one block using the caller's hash table.
///
/// The table is reset first, so no match ever reaches outside `input`.
pub fn compress_block_with(
    input: &[u8],
    output: &mut [u8],
    table: &mut HashTable,
) -> Result<usize> {
    let input_len = input.len();

    if input_len < MIN_INPUT_SIZE {
        return write_last_literals(output, 0, input);
    }

    table.reset();

    let match_limit = input_len - LAST_LITERALS;
    let mf_limit = input_len - MF_LIMIT;

    let mut input_pos = 0;
    let mut output_pos = 0;
    let mut anchor = 0; // Start of current literal run
    let mut misses = 0usize;

    while input_pos <= mf_limit {
        let sequence = read_u32_le(input, input_pos);
        let candidate = table.replace(sequence, input_pos);

        if candidate < input_pos
            && input_pos - candidate <= MAX_OFFSET
            && read_u32_le(input, candidate) == sequence
        {
            // Pull the match start back over equal pending literals.
            let mut start = input_pos;
            let mut source = candidate;
            while start > anchor && source > 0 && input[start - 1] == input[source - 1] {
                start -= 1;
                source -= 1;
            }

            let match_len = (input_pos - start)
                + MIN_MATCH
                + count_match(
                    input,
                    candidate + MIN_MATCH,
                    input_pos + MIN_MATCH,
                    match_limit,
                );
            let offset = (input_pos - candidate) as u16;

            output_pos = write_sequence(
                output,
                output_pos,
                &input[anchor..start],
                offset,
                match_len,
            )?;

            input_pos = start + match_len;
            anchor = input_pos;
            misses = 0;

            if input_pos <= mf_limit {
                table.insert(read_u32_le(input, input_pos - 2), input_pos - 2);
            }
        } else {
            misses += 1;
            input_pos += 1 + (misses >> SKIP_TRIGGER);
        }
    }

    write_last_literals(output, output_pos, &input[anchor..])
}

/// Write a sequence (literals + match) to output.
fn write_sequence(
    output: &mut [u8],
    mut pos: usize,
    literals: &[u8],
    offset: u16,
    match_len: usize,
) -> Result<usize> {
    let literal_len = literals.len();
    let match_code = match_len - MIN_MATCH;

    let needed = 1
        + length_extension_size(literal_len)
        + literal_len
        + 2
        + length_extension_size(match_code);
    if pos + needed > output.len() {
        return Err(Error::buffer_too_small(pos + needed, output.len()));
    }

    output[pos] = token(literal_len, match_code);
    pos += 1;
    pos = write_length(output, pos, literal_len);

    output[pos..pos + literal_len].copy_from_slice(literals);
    pos += literal_len;

    output[pos..pos + 2].copy_from_slice(&offset.to_le_bytes());
    pos += 2;

    Ok(write_length(output, pos, match_code))
}

/// Write final literals (no match follows).
fn write_last_literals(output: &mut [u8], mut pos: usize, literals: &[u8]) -> Result<usize> {
    let literal_len = literals.len();

    let needed = 1 + length_extension_size(literal_len) + literal_len;
    if pos + needed > output.len() {
        return Err(Error::buffer_too_small(pos + needed, output.len()));
    }

    output[pos] = token(literal_len, 0);
    pos += 1;
    pos = write_length(output, pos, literal_len);

    output[pos..pos + literal_len].copy_from_slice(literals);
    Ok(pos + literal_len)
}

/// Decompress an LZ4 block into the start of `output`.
///
/// Returns the number of bytes written.
pub fn decompress_block(input: &[u8], output: &mut [u8]) -> Result<usize> {
    decompress_block_at(input, output, 0)
}

/// Decompress an LZ4 block, writing from `dest_start` onward.
///
/// Bytes before `dest_start` are earlier output: back-references may reach
/// into them but never before index 0. Returns the new write offset.
pub fn decompress_block_at(input: &[u8], output: &mut [u8], dest_start: usize) -> Result<usize> {
    if dest_start > output.len() {
        return Err(Error::buffer_too_small(dest_start, output.len()));
    }

    let mut input_pos = 0;
    let mut output_pos = dest_start;

    while input_pos < input.len() {
        let token = input[input_pos];
        input_pos += 1;

        let literal_len = read_length(input, &mut input_pos, (token >> 4) as usize)?;

        if literal_len > 0 {
            let literal_end = input_pos
                .checked_add(literal_len)
                .filter(|&end| end <= input.len())
                .ok_or_else(|| Error::unexpected_eof(input.len()))?;
            if output_pos + literal_len > output.len() {
                return Err(Error::buffer_too_small(
                    output_pos + literal_len,
                    output.len(),
                ));
            }
            output[output_pos..output_pos + literal_len]
                .copy_from_slice(&input[input_pos..literal_end]);
            input_pos = literal_end;
            output_pos += literal_len;
        }

        // Final sequence carries literals only
        if input_pos >= input.len() {
            break;
        }

        if input_pos + 2 > input.len() {
            return Err(Error::unexpected_eof(input.len()));
        }
        let offset = u16::from_le_bytes([input[input_pos], input[input_pos + 1]]) as usize;
        input_pos += 2;

        if offset == 0 || offset > output_pos {
            return Err(Error::invalid_offset(offset, output_pos));
        }

        let match_len = read_length(input, &mut input_pos, (token & 0x0F) as usize)? + MIN_MATCH;
        if output_pos + match_len > output.len() {
            return Err(Error::buffer_too_small(
                output_pos + match_len,
                output.len(),
            ));
        }

        copy_match(output, output_pos, offset, match_len);
        output_pos += match_len;
    }

    Ok(output_pos)
}

/// Copy `len` bytes from `pos - offset` to `pos`, front to back.
///
/// Source and destination overlap whenever `offset < len`; copying in
/// strides of at most `offset` bytes keeps every read behind the write
/// cursor, which replicates the repeating pattern.
#[inline]
fn copy_match(output: &mut [u8], pos: usize, offset: usize, len: usize) {
    let start = pos - offset;
    if offset == 1 {
        let byte = output[start];
        output[pos..pos + len].fill(byte);
        return;
    }

    let mut copied = 0;
    while copied < len {
        let chunk = offset.min(len - copied);
        output.copy_within(start + copied..start + copied + chunk, pos + copied);
        copied += chunk;
    }
}

/// Calculate maximum compressed size for given input length.
/// LZ4 guarantees a block never exceeds this.
pub fn max_compressed_size(input_len: usize) -> usize {
    input_len + (input_len / 255) + 16
}

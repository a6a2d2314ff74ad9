//! Component D: look-up table compression (spec §4.3). The chunk-offset
//! table (`nChunks + 1` monotonically increasing `u64` byte offsets) is
//! split into fixed-size groups, each group compressed independently with
//! `p4ndenc64`, and every compressed group padded to the size of the
//! largest one so any group is locatable by `index * lut_chunk_length`
//! without scanning (spec §4.3, §9 "LUT group padding").
//!
//! Grounded in `om_encoder_size_of_compressed_lut`/`om_encoder_compress_lut`
//! (`original_source/.../om_encoder.c`): both there and here, the size is
//! measured by actually compressing every group once, not estimated from a
//! formula — `om_encoder_size_of_compressed_lut` runs the same loop as
//! `om_encoder_compress_lut` and only keeps the max length. The one
//! deviation from the C is the scratch output buffer per group: the C
//! version uses a fixed `MAX_LUT_ELEMENTS+32`-byte stack buffer whose
//! constant isn't available here, so this crate sizes its scratch buffer
//! from `lut_chunk_element_count` instead (see DESIGN.md).

use om_file_format_sys::p4ndenc64;

use crate::utils::divide_rounded_up_u64;

/// Scratch capacity for one compressed group's output, generous enough that
/// `p4ndenc64` never overruns it for up to `lut_chunk_element_count` u64s.
fn lut_group_scratch_capacity(lut_chunk_element_count: usize) -> usize {
    lut_chunk_element_count * 8 + 1024
}

/// Exact compressed size of `lut`'s look-up table, measured by running the
/// same per-group compression [`compress_lut`] performs and keeping the
/// largest group (spec §4.3). Used to size the `out` buffer ahead of a real
/// call to [`compress_lut`].
pub fn size_of_compressed_lut(lut: &[u64], lut_chunk_element_count: usize) -> u64 {
    assert!(!lut.is_empty(), "lut must contain at least one offset");
    let n_groups = divide_rounded_up_u64(lut.len() as u64, lut_chunk_element_count as u64);

    let mut scratch_src = lut.to_vec();
    let mut scratch_out = vec![0u8; lut_group_scratch_capacity(lut_chunk_element_count)];
    let mut max_length = 0u64;

    for g in 0..n_groups as usize {
        let start = g * lut_chunk_element_count;
        let end = std::cmp::min(start + lut_chunk_element_count, lut.len());
        let group = &mut scratch_src[start..end];
        let len = unsafe { p4ndenc64(group.as_mut_ptr(), group.len(), scratch_out.as_mut_ptr()) };
        max_length = max_length.max(len as u64);
    }

    max_length * n_groups
}

/// Result of [`compress_lut`]: the real compressed size written to `out`,
/// and the padded per-group stride (`lutChunkLength`) needed to locate any
/// group directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedLut {
    pub total_size: u64,
    pub lut_chunk_length: u64,
}

/// Compresses `lut` (the `nChunks + 1` chunk-end byte offsets, spec §4.3)
/// into `out`, grouping every `lut_chunk_element_count` values and padding
/// each compressed group to the longest one with zero bytes.
///
/// `out` must be at least
/// `size_of_compressed_lut(lut, lut_chunk_element_count)` bytes. `lut` is
/// consumed by the codec call and left in an unspecified state on return,
/// matching the upstream C which passes the live look-up table by mutable
/// pointer into `p4ndenc64` (spec §4.3 treats the LUT as build-time-only
/// scratch, not something read back after compression).
pub fn compress_lut(lut: &mut [u64], out: &mut [u8], lut_chunk_element_count: usize) -> CompressedLut {
    assert!(!lut.is_empty(), "lut must contain at least one offset");
    let n_groups = divide_rounded_up_u64(lut.len() as u64, lut_chunk_element_count as u64) as usize;

    let mut scratch = vec![0u8; lut_group_scratch_capacity(lut_chunk_element_count)];
    let mut group_outputs: Vec<Vec<u8>> = Vec::with_capacity(n_groups);
    let mut lut_chunk_length = 0usize;

    for g in 0..n_groups {
        let start = g * lut_chunk_element_count;
        let end = std::cmp::min(start + lut_chunk_element_count, lut.len());
        let group = &mut lut[start..end];
        let compressed_len = unsafe { p4ndenc64(group.as_mut_ptr(), group.len(), scratch.as_mut_ptr()) };
        lut_chunk_length = lut_chunk_length.max(compressed_len);
        group_outputs.push(scratch[..compressed_len].to_vec());
    }

    log::debug!(
        "compressed lut: {} groups, lut_chunk_length={} bytes",
        n_groups,
        lut_chunk_length
    );

    for (g, data) in group_outputs.iter().enumerate() {
        let group_start = g * lut_chunk_length;
        out[group_start..group_start + data.len()].copy_from_slice(data);
        for b in out[group_start + data.len()..group_start + lut_chunk_length].iter_mut() {
            *b = 0;
        }
    }

    CompressedLut {
        total_size: (n_groups * lut_chunk_length) as u64,
        lut_chunk_length: lut_chunk_length as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_of_compressed_lut_covers_all_groups() {
        // 6 offsets grouped by 2 -> 3 groups.
        let lut: Vec<u64> = vec![0, 100, 250, 400, 4000, 4096];
        let size = size_of_compressed_lut(&lut, 2);
        assert!(size > 0);
        assert_eq!(size % 3, 0);
    }

    #[test]
    fn compress_lut_round_trips_through_padding() {
        let lut: Vec<u64> = vec![0, 100, 250, 400, 4000, 4096];
        let size = size_of_compressed_lut(&lut, 2) as usize;
        let mut out = vec![0u8; size];
        let mut lut_mut = lut.clone();
        let result = compress_lut(&mut lut_mut, &mut out, 2);

        assert!(result.lut_chunk_length > 0);
        assert_eq!(result.total_size, 3 * result.lut_chunk_length);
        // Every group must be reachable via a fixed stride.
        for g in 0..3 {
            let start = g * result.lut_chunk_length as usize;
            assert!(start + result.lut_chunk_length as usize <= out.len());
        }
    }

    #[test]
    fn compress_lut_single_group_when_chunk_element_count_covers_all_values() {
        let lut: Vec<u64> = vec![0, 8192, 16384];
        let size = size_of_compressed_lut(&lut, 8) as usize;
        let mut out = vec![0u8; size];
        let mut lut_mut = lut.clone();
        let result = compress_lut(&mut lut_mut, &mut out, 8);
        assert_eq!(result.total_size, result.lut_chunk_length);
    }
}

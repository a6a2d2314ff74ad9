//! Component A: chunk-count and chunk-shape arithmetic over an N-dimensional
//! grid. Every quantity here is a pure function of `dimensions`/`chunks`
//! slices; no state is retained.

use crate::utils::divide_rounded_up_u64;

/// `nChunks = ∏_i ⌈dimensions[i] / chunks[i]⌉` (spec §3.1, §4.1).
pub fn number_of_chunks(dimensions: &[u64], chunks: &[u64]) -> u64 {
    debug_assert_eq!(dimensions.len(), chunks.len());
    dimensions
        .iter()
        .zip(chunks)
        .map(|(dim, chunk)| divide_rounded_up_u64(*dim, *chunk))
        .product()
}

/// `chunks_in_region(region_count, chunks) = ∏ ⌈region_count[i]/chunks[i]⌉`
/// (spec §4.1) — the number of chunks touched by a sub-region of extent
/// `region_count`, used when a caller streams a partial write.
pub fn chunks_in_region(region_count: &[u64], chunks: &[u64]) -> u64 {
    debug_assert_eq!(region_count.len(), chunks.len());
    region_count
        .iter()
        .zip(chunks)
        .map(|(count, chunk)| divide_rounded_up_u64(*count, *chunk))
        .product()
}

/// `chunkLength = ∏_i chunks[i]`, the nominal (untruncated) chunk element
/// count (spec §3.1).
pub fn chunk_length(chunks: &[u64]) -> u64 {
    chunks.iter().product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_of_chunks_matches_product_of_ceil_divisions() {
        assert_eq!(number_of_chunks(&[5, 5], &[2, 2]), 9);
        assert_eq!(number_of_chunks(&[10, 20], &[5, 10]), 4);
        assert_eq!(number_of_chunks(&[4], &[2]), 2);
    }

    #[test]
    fn number_of_chunks_handles_chunk_larger_than_dimension() {
        // chunks[i] > dimensions[i] is explicitly allowed; the single chunk
        // along that axis is truncated when materialised.
        assert_eq!(number_of_chunks(&[3], &[10]), 1);
    }

    #[test]
    fn chunks_in_region_tracks_a_sub_cuboid() {
        assert_eq!(chunks_in_region(&[3, 4], &[2, 2]), 4);
        assert_eq!(chunks_in_region(&[5, 5], &[2, 2]), 9);
    }

    #[test]
    fn chunk_length_is_product_of_chunk_extents() {
        assert_eq!(chunk_length(&[2, 2]), 4);
        assert_eq!(chunk_length(&[5, 10, 3]), 150);
    }
}

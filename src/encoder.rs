//! Components B and C: the chunk materialiser and chunk compressor (spec
//! §4.2, §4.4). `Encoder` is the immutable configuration described in spec
//! §3.1; `write_single_chunk` is the pure per-chunk contract of spec §4.2.
//!
//! Grounded directly in the upstream C implementation
//! (`om_encoder_writeSingleChunk`, `original_source/.../om_encoder.c`)
//! rather than this codebase's own `src/om/encoder.rs`, whose streaming
//! `write_next_chunks` loop had drifted on the logarithmic transform (see
//! DESIGN.md).

use std::cmp::min;
use std::slice;

use om_file_format_sys::{fpxenc32, p4nzenc128v16};

use crate::core::compression::{p4nenc256_bound, CompressionType};
use crate::core::data_types::DataType;
use crate::core::delta2d;
use crate::core::dimensions;
use crate::utils::divide_rounded_up_u64;

/// Sentinel written for non-finite (NaN) source samples under either
/// 16-bit integer codec (spec §4.2, §9 "NaN sentinel").
const NAN_SENTINEL_I16: i16 = i16::MAX;

/// Encoder configuration (spec §3.1). Borrows the caller's `dimensions`
/// and `chunks` slices rather than cloning them — spec §5 requires their
/// lifetime to outlive the encoder, which a lifetime parameter expresses
/// directly instead of the raw-pointer discipline the C original needs.
pub struct Encoder<'a> {
    pub scale_factor: f32,
    pub compression: CompressionType,
    /// Informative only; the compression variant determines the staging
    /// element width (spec §3.1).
    pub data_type: DataType,
    pub dimensions: &'a [u64],
    pub chunks: &'a [u64],
    pub lut_chunk_element_count: usize,
}

impl<'a> Encoder<'a> {
    pub fn new(
        scale_factor: f32,
        compression: CompressionType,
        data_type: DataType,
        dimensions: &'a [u64],
        chunks: &'a [u64],
        lut_chunk_element_count: usize,
    ) -> Self {
        assert_eq!(
            dimensions.len(),
            chunks.len(),
            "dimensions and chunks must have the same rank"
        );
        assert!(lut_chunk_element_count > 0, "lut_chunk_element_count must be > 0");
        assert!(
            matches!(
                compression,
                CompressionType::P4nzdec256
                    | CompressionType::Fpxdec32
                    | CompressionType::P4nzdec256logarithmic
            ),
            "{compression:?} is a descriptor-only compression type, not a valid encoder codec"
        );
        log::debug!(
            "creating encoder: dimensions={:?} chunks={:?} compression={:?}",
            dimensions,
            chunks,
            compression
        );
        Self {
            scale_factor,
            compression,
            data_type,
            dimensions,
            chunks,
            lut_chunk_element_count,
        }
    }

    /// `nChunks = ∏ ⌈dimensions[i]/chunks[i]⌉` (spec §3.1).
    pub fn number_of_chunks(&self) -> u64 {
        dimensions::number_of_chunks(self.dimensions, self.chunks)
    }

    /// `chunkLength = ∏ chunks[i]`, the nominal chunk element count.
    pub fn chunk_length(&self) -> u64 {
        dimensions::chunk_length(self.chunks)
    }

    /// `chunkBufferSize = P4NENC256_BOUND(chunkLength)` (spec §3.1) — the
    /// scratch staging buffer size in bytes, shared by both codec paths.
    pub fn chunk_buffer_size(&self) -> u64 {
        p4nenc256_bound(self.chunk_length())
    }

    /// `outputBufferCapacity = max(4096, max(8·nChunks, chunkBufferSize))`
    /// (spec §3.1).
    pub fn output_buffer_capacity(&self) -> u64 {
        let n_chunks = self.number_of_chunks();
        std::cmp::max(4096, std::cmp::max(8 * n_chunks, self.chunk_buffer_size()))
    }

    /// Component B+C (spec §4.2): copies, quantises, delta-codes and
    /// compresses a single chunk from `array` into `out`, returning the
    /// number of compressed bytes written.
    ///
    /// Preconditions (caller obligations, checked with `debug_assert!`):
    /// `array.len() == array_dimensions.iter().product()`;
    /// `array_offset[i] + array_count[i] <= array_dimensions[i]` for all
    /// `i`; `out.len() >= chunk_buffer_size()` as bytes;
    /// `chunk_buffer.len() >= chunk_buffer_size() as usize`.
    pub fn write_single_chunk(
        &self,
        array: &[f32],
        array_dimensions: &[u64],
        array_offset: &[u64],
        array_count: &[u64],
        chunk_index: u64,
        chunk_index_offset_in_array: u64,
        out: &mut [u8],
        chunk_buffer: &mut [u8],
    ) -> usize {
        let d = self.dimensions.len();
        debug_assert_eq!(array_dimensions.len(), d);
        debug_assert_eq!(array_offset.len(), d);
        debug_assert_eq!(array_count.len(), d);
        debug_assert_eq!(
            array.len() as u64,
            array_dimensions.iter().product::<u64>()
        );

        let array_total_count: u64 = array_dimensions.iter().product();

        let mut rolling_multiply = 1u64;
        let mut rolling_multiply_chunk_length = 1u64;
        let mut rolling_multiply_target_cube = 1u64;
        let mut read_coordinate = 0u64;
        let mut write_coordinate = 0u64;
        let mut linear_read_count = 1u64;
        let mut linear_read = true;
        let mut length_last = 0u64;

        // Unpack coordinates, innermost axis first (spec §4.2 step 1).
        for i in (0..d).rev() {
            let n_chunks_in_this_dimension =
                divide_rounded_up_u64(self.dimensions[i], self.chunks[i]);
            let c0 = (chunk_index / rolling_multiply) % n_chunks_in_this_dimension;
            let c0_offset =
                (chunk_index_offset_in_array / rolling_multiply) % n_chunks_in_this_dimension;
            let length0 =
                min((c0 + 1) * self.chunks[i], self.dimensions[i]) - c0 * self.chunks[i];

            if i == d - 1 {
                length_last = length0;
            }

            read_coordinate +=
                rolling_multiply_target_cube * (c0_offset * self.chunks[i] + array_offset[i]);

            debug_assert!(length0 <= array_count[i]);
            debug_assert!(length0 <= array_dimensions[i]);

            if i == d - 1 && !(array_count[i] == length0 && array_dimensions[i] == length0) {
                linear_read_count = length0;
                linear_read = false;
            }
            if linear_read && array_count[i] == length0 && array_dimensions[i] == length0 {
                linear_read_count *= length0;
            } else {
                linear_read = false;
            }

            rolling_multiply *= n_chunks_in_this_dimension;
            rolling_multiply_target_cube *= array_dimensions[i];
            rolling_multiply_chunk_length *= length0;
        }

        let length_in_chunk = rolling_multiply_chunk_length;
        log::trace!(
            "write_single_chunk: chunk_index={} length_in_chunk={} length_last={}",
            chunk_index,
            length_in_chunk,
            length_last
        );

        // Copy contiguous runs into the staging buffer, re-deriving the next
        // run at each chunk/region boundary (spec §4.2 step 2).
        'outer: loop {
            self.stage_run(
                array,
                chunk_buffer,
                read_coordinate,
                write_coordinate,
                linear_read_count,
                array_total_count,
                length_in_chunk,
            );

            read_coordinate += linear_read_count - 1;
            write_coordinate += linear_read_count - 1;
            write_coordinate += 1;

            rolling_multiply_target_cube = 1;
            linear_read = true;
            linear_read_count = 1;

            for i in (0..d).rev() {
                let q_pos = ((read_coordinate / rolling_multiply_target_cube) % array_dimensions[i]
                    - array_offset[i])
                    / self.chunks[i];
                let length0 =
                    min((q_pos + 1) * self.chunks[i], array_count[i]) - q_pos * self.chunks[i];
                read_coordinate += rolling_multiply_target_cube;

                if i == d - 1 && !(array_count[i] == length0 && array_dimensions[i] == length0) {
                    linear_read_count = length0;
                    linear_read = false;
                }
                if linear_read && array_count[i] == length0 && array_dimensions[i] == length0 {
                    linear_read_count *= length0;
                } else {
                    linear_read = false;
                }

                let q0 = ((read_coordinate / rolling_multiply_target_cube) % array_dimensions[i]
                    - array_offset[i])
                    % self.chunks[i];
                if q0 != 0 && q0 != length0 {
                    // This axis hasn't rolled over: the next run is ready.
                    continue 'outer;
                }

                read_coordinate -= length0 * rolling_multiply_target_cube;
                rolling_multiply_target_cube *= array_dimensions[i];

                if i == 0 {
                    // Axis 0 rolled over: the whole chunk has been staged.
                    break 'outer;
                }
            }
        }

        self.compress_staged_chunk(chunk_buffer, out, length_in_chunk, length_last)
    }

    /// Copies `linear_read_count` source elements starting at
    /// `read_coordinate`, quantising/transforming per `self.compression`,
    /// into `chunk_buffer` starting at `write_coordinate` (spec §4.2 step 2).
    fn stage_run(
        &self,
        array: &[f32],
        chunk_buffer: &mut [u8],
        read_coordinate: u64,
        write_coordinate: u64,
        linear_read_count: u64,
        array_total_count: u64,
        length_in_chunk: u64,
    ) {
        let read_coordinate = read_coordinate as usize;
        let write_coordinate = write_coordinate as usize;
        let linear_read_count = linear_read_count as usize;

        match self.compression {
            CompressionType::P4nzdec256 => {
                let staging = as_i16_slice_mut(chunk_buffer);
                for i in 0..linear_read_count {
                    debug_assert!((read_coordinate + i) < array_total_count as usize);
                    debug_assert!((write_coordinate + i) < length_in_chunk as usize);
                    let val = array[read_coordinate + i];
                    staging[write_coordinate + i] = quantize_linear(val, self.scale_factor);
                }
            }
            CompressionType::P4nzdec256logarithmic => {
                let staging = as_i16_slice_mut(chunk_buffer);
                for i in 0..linear_read_count {
                    debug_assert!((read_coordinate + i) < array_total_count as usize);
                    debug_assert!((write_coordinate + i) < length_in_chunk as usize);
                    let val = array[read_coordinate + i];
                    staging[write_coordinate + i] = quantize_logarithmic(val, self.scale_factor);
                }
            }
            CompressionType::Fpxdec32 => {
                let staging = as_f32_slice_mut(chunk_buffer);
                for i in 0..linear_read_count {
                    debug_assert!((read_coordinate + i) < array_total_count as usize);
                    debug_assert!((write_coordinate + i) < length_in_chunk as usize);
                    staging[write_coordinate + i] = array[read_coordinate + i];
                }
            }
            CompressionType::Pfor16bitDelta2dLegacy | CompressionType::None => unreachable!(
                "Encoder::new rejects descriptor-only compression types"
            ),
        }
    }

    /// Component C (spec §4.2 step 3, §4.4): applies the 2-D delta over the
    /// staged chunk and hands it to the codec.
    fn compress_staged_chunk(
        &self,
        chunk_buffer: &mut [u8],
        out: &mut [u8],
        length_in_chunk: u64,
        length_last: u64,
    ) -> usize {
        let rows = (length_in_chunk / length_last) as usize;
        let cols = length_last as usize;
        match self.compression {
            CompressionType::P4nzdec256 | CompressionType::P4nzdec256logarithmic => {
                let staging = as_i16_slice_mut(chunk_buffer);
                let staging = &mut staging[..length_in_chunk as usize];
                delta2d::delta2d_encode(rows, cols, staging);
                unsafe {
                    p4nzenc128v16(
                        staging.as_mut_ptr() as *mut u16,
                        length_in_chunk as usize,
                        out.as_mut_ptr(),
                    )
                }
            }
            CompressionType::Fpxdec32 => {
                let staging = as_f32_slice_mut(chunk_buffer);
                let staging = &mut staging[..length_in_chunk as usize];
                delta2d::delta2d_encode_xor(rows, cols, staging);
                unsafe {
                    fpxenc32(
                        staging.as_mut_ptr() as *mut u32,
                        length_in_chunk as usize,
                        out.as_mut_ptr(),
                        0,
                    )
                }
            }
            CompressionType::Pfor16bitDelta2dLegacy | CompressionType::None => unreachable!(
                "Encoder::new rejects descriptor-only compression types"
            ),
        }
    }
}

/// `clamp(round(val · scale_factor), INT16_MIN, INT16_MAX)`, or the NaN
/// sentinel (spec §4.2 step 2, `P4NZDEC256`).
fn quantize_linear(val: f32, scale_factor: f32) -> i16 {
    if val.is_nan() {
        return NAN_SENTINEL_I16;
    }
    let scaled = val * scale_factor;
    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// `clamp(round(log10(1 + val) · scale_factor), INT16_MIN, INT16_MAX)`, or
/// the NaN sentinel (spec §4.2 step 2, `P4NZDEC256_LOGARITHMIC`). Matches
/// the upstream C formula `log10f(1 + val)`; see DESIGN.md for why this
/// differs from this codebase's own drifted `src/om/encoder.rs` port.
fn quantize_logarithmic(val: f32, scale_factor: f32) -> i16 {
    if val.is_nan() {
        return NAN_SENTINEL_I16;
    }
    let scaled = (1.0 + val).log10() * scale_factor;
    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

fn as_i16_slice_mut(buffer: &mut [u8]) -> &mut [i16] {
    // Safety: `buffer` is caller-provided scratch sized by
    // `chunk_buffer_size()`, which already accounts for i16 staging width.
    unsafe { slice::from_raw_parts_mut(buffer.as_mut_ptr() as *mut i16, buffer.len() / 2) }
}

fn as_f32_slice_mut(buffer: &mut [u8]) -> &mut [f32] {
    // Safety: see `as_i16_slice_mut`; f32 staging uses the full 4-byte width
    // `chunk_buffer_size()` was sized for.
    unsafe { slice::from_raw_parts_mut(buffer.as_mut_ptr() as *mut f32, buffer.len() / 4) }
}

//! Component C's in-place delta transforms. `chunkBuffer` is reinterpreted
//! as a row-major 2-D block of `rows × cols` elements (`rows =
//! lengthInChunk/lengthLast`, `cols = lengthLast`, spec §4.2 step 3) and
//! delta-coded along the slow axis (rows), so that the fastest-varying axis
//! (`lengthLast`) stays intact for the codec's own delta handling.

use std::mem;

/// Bitwise-reinterprets a mutable `[f32]` slice as `[i32]` of the same
/// length, for XOR-delta arithmetic (floats don't support `^=`).
fn as_i32_slice_mut(buffer: &mut [f32]) -> &mut [i32] {
    let ptr = buffer.as_mut_ptr() as *mut i32;
    // Safety: f32 and i32 have identical size and alignment; `buffer` stays
    // borrowed for the lifetime of the returned slice.
    unsafe { std::slice::from_raw_parts_mut(ptr, buffer.len()) }
}

/// Decodes a 2-D horizontal delta on 16-bit integers: row `d0` becomes
/// `row[d0] + row[d0-1]`, applied from the first row outward.
#[inline(always)]
pub fn delta2d_decode(rows: usize, cols: usize, buffer: &mut [i16]) {
    if rows <= 1 {
        return;
    }
    debug_assert!(buffer.len() >= rows * cols);
    for d0 in 1..rows {
        for d1 in 0..cols {
            let index = d0 * cols + d1;
            let prev_index = (d0 - 1) * cols + d1;
            buffer[index] = buffer[index].wrapping_add(buffer[prev_index]);
        }
    }
}

/// Encodes a 2-D horizontal delta on 16-bit integers in place: row `d0`
/// becomes `row[d0] - row[d0-1]`, applied from the last row backward so
/// each row's original value is still available when its successor needs
/// it (spec §4.2 step 3, §9 "in-place codec transforms").
#[inline(always)]
pub fn delta2d_encode(rows: usize, cols: usize, buffer: &mut [i16]) {
    if rows <= 1 {
        return;
    }
    debug_assert!(buffer.len() >= rows * cols);
    for d0 in (1..rows).rev() {
        for d1 in 0..cols {
            let index = d0 * cols + d1;
            let prev_index = (d0 - 1) * cols + d1;
            buffer[index] = buffer[index].wrapping_sub(buffer[prev_index]);
        }
    }
}

/// Decodes a 2-D XOR delta on float32, applied bitwise via the identical
/// `i32` representation (spec §4.2 step 3, float path).
#[inline(always)]
pub fn delta2d_decode_xor(rows: usize, cols: usize, buffer: &mut [f32]) {
    if rows <= 1 {
        return;
    }
    debug_assert!(buffer.len() >= rows * cols);
    let buffer = as_i32_slice_mut(buffer);
    for d0 in 1..rows {
        for d1 in 0..cols {
            let index = d0 * cols + d1;
            let prev_index = (d0 - 1) * cols + d1;
            buffer[index] ^= buffer[prev_index];
        }
    }
}

/// Encodes a 2-D XOR delta on float32 in place, last row backward, mirroring
/// `delta2d_encode`'s traversal order.
#[inline(always)]
pub fn delta2d_encode_xor(rows: usize, cols: usize, buffer: &mut [f32]) {
    if rows <= 1 {
        return;
    }
    debug_assert!(buffer.len() >= rows * cols);
    let buffer = as_i32_slice_mut(buffer);
    for d0 in (1..rows).rev() {
        for d1 in 0..cols {
            let index = d0 * cols + d1;
            let prev_index = (d0 - 1) * cols + d1;
            buffer[index] ^= buffer[prev_index];
        }
    }
}

const _: () = assert!(mem::size_of::<f32>() == mem::size_of::<i32>());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta2d_roundtrip() {
        let mut buffer: Vec<i16> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let original = buffer.clone();
        delta2d_encode(2, 5, &mut buffer);
        delta2d_decode(2, 5, &mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn delta2d_encode_is_a_row_wise_difference() {
        let mut buffer: Vec<i16> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        delta2d_encode(2, 5, &mut buffer);
        assert_eq!(buffer, vec![1, 2, 3, 4, 5, 5, 5, 5, 5, 5]);
    }

    #[test]
    fn delta2d_single_row_is_a_no_op() {
        let mut buffer: Vec<i16> = vec![1, 2, 3];
        delta2d_encode(1, 3, &mut buffer);
        assert_eq!(buffer, vec![1, 2, 3]);
    }

    #[test]
    fn delta2d_xor_roundtrip() {
        let mut buffer: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let original = buffer.clone();
        delta2d_encode_xor(2, 5, &mut buffer);
        delta2d_decode_xor(2, 5, &mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn delta2d_xor_single_row_is_a_no_op() {
        let mut buffer: Vec<f32> = vec![1.0, 2.0, 3.0];
        delta2d_encode_xor(1, 3, &mut buffer);
        assert_eq!(buffer, vec![1.0, 2.0, 3.0]);
    }
}

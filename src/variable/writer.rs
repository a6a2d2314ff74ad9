//! Component F: the variable layout writer. Serialises scalar and
//! numeric-array descriptors into a caller-owned buffer (spec §4.6).
//!
//! Writer pre-conditions (buffer too small, type/width mismatches) are
//! programmer errors checked with `assert!`/`expect` rather than `Result`,
//! matching spec §7: "the core never retries... pre-condition violations
//! are programmer errors that implementations may check with assertions
//! and halt." Only the reader (E) surfaces a recoverable error type.

use crate::core::compression::CompressionType;
use crate::core::data_types::{DataType, OmFileArrayDataType, OmFileScalarDataType};

use super::{OffsetSize, ARRAY_HEADER_SIZE, OFFSET_SIZE_WIDTH, SCALAR_HEADER_SIZE};

/// `8 + 16·n_children + valueWidth(data_type) + name_len` (spec §4.6).
pub fn write_scalar_size(name_len: usize, n_children: u32, data_type: DataType) -> usize {
    let width = data_type
        .scalar_value_width()
        .unwrap_or_else(|| panic!("{data_type:?} has no fixed scalar width"));
    SCALAR_HEADER_SIZE + 16 * n_children as usize + width as usize + name_len
}

/// `sizeof(arrayHeader) + 16·n_children + 16·dim_count + name_len` (spec §4.6).
pub fn write_array_size(name_len: usize, n_children: u32, dim_count: u64) -> usize {
    ARRAY_HEADER_SIZE + 16 * n_children as usize + 16 * dim_count as usize + name_len
}

fn write_children(dst: &mut [u8], children: &[OffsetSize]) {
    for (i, child) in children.iter().enumerate() {
        let base = i * OFFSET_SIZE_WIDTH;
        dst[base..base + 8].copy_from_slice(&child.offset.to_le_bytes());
        dst[base + 8..base + 16].copy_from_slice(&child.size.to_le_bytes());
    }
}

/// Serialises a scalar descriptor: header, children table, value, name
/// (spec §3.3, §4.6). `dst` must be at least
/// `write_scalar_size(name.len(), children.len() as u32, T::DATA_TYPE_SCALAR)`
/// bytes; `offset` is recorded unmodified in the returned [`OffsetSize`].
pub fn write_scalar<T: OmFileScalarDataType>(
    dst: &mut [u8],
    offset: u64,
    children: &[OffsetSize],
    name: &[u8],
    value: &T,
) -> OffsetSize {
    let data_type = T::DATA_TYPE_SCALAR;
    let width = data_type
        .scalar_value_width()
        .unwrap_or_else(|| panic!("{data_type:?} has no fixed scalar width")) as usize;
    let n_children = children.len();
    assert!(name.len() <= u16::MAX as usize, "name too long for length_of_name field");
    let size = SCALAR_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH + width + name.len();
    assert!(dst.len() >= size, "destination buffer too small for scalar descriptor");

    dst[0] = data_type as u8;
    dst[1] = CompressionType::None as u8;
    dst[2..4].copy_from_slice(&(name.len() as u16).to_le_bytes());
    dst[4..8].copy_from_slice(&(n_children as u32).to_le_bytes());

    write_children(&mut dst[SCALAR_HEADER_SIZE..], children);

    let value_base = SCALAR_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH;
    value.with_raw_bytes(|bytes| dst[value_base..value_base + width].copy_from_slice(bytes));

    let name_base = value_base + width;
    dst[name_base..name_base + name.len()].copy_from_slice(name);

    OffsetSize { offset, size: size as u64 }
}

/// Serialises a numeric-array descriptor: header, children table,
/// dimensions, chunks, name (spec §3.3, §4.6). `dst` must be at least
/// `write_array_size(name.len(), children.len() as u32, dimensions.len() as u64)`
/// bytes.
#[allow(clippy::too_many_arguments)]
pub fn write_array<T: OmFileArrayDataType>(
    dst: &mut [u8],
    offset: u64,
    children: &[OffsetSize],
    name: &[u8],
    compression: CompressionType,
    scale_factor: f32,
    add_offset: f32,
    dimensions: &[u64],
    chunks: &[u64],
    lut_size: u64,
    lut_offset: u64,
) -> OffsetSize {
    assert_eq!(dimensions.len(), chunks.len(), "dimensions and chunks must have the same rank");
    assert!(name.len() <= u16::MAX as usize, "name too long for length_of_name field");

    let n_children = children.len();
    let dim_count = dimensions.len();
    let size = ARRAY_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH + 16 * dim_count + name.len();
    assert!(dst.len() >= size, "destination buffer too small for array descriptor");

    dst[0] = T::DATA_TYPE_ARRAY as u8;
    dst[1] = compression as u8;
    dst[2..4].copy_from_slice(&(name.len() as u16).to_le_bytes());
    dst[4..8].copy_from_slice(&(n_children as u32).to_le_bytes());
    dst[8..12].copy_from_slice(&scale_factor.to_le_bytes());
    dst[12..16].copy_from_slice(&add_offset.to_le_bytes());
    dst[16..24].copy_from_slice(&(dim_count as u64).to_le_bytes());
    dst[24..32].copy_from_slice(&lut_size.to_le_bytes());
    dst[32..40].copy_from_slice(&lut_offset.to_le_bytes());

    write_children(&mut dst[ARRAY_HEADER_SIZE..], children);

    let dims_base = ARRAY_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH;
    for (i, &d) in dimensions.iter().enumerate() {
        let at = dims_base + i * 8;
        dst[at..at + 8].copy_from_slice(&d.to_le_bytes());
    }
    let chunks_base = dims_base + dim_count * 8;
    for (i, &c) in chunks.iter().enumerate() {
        let at = chunks_base + i * 8;
        dst[at..at + 8].copy_from_slice(&c.to_le_bytes());
    }

    let name_base = chunks_base + dim_count * 8;
    dst[name_base..name_base + name.len()].copy_from_slice(name);

    OffsetSize { offset, size: size as u64 }
}

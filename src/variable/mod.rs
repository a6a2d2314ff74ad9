//! Components E and F: the variable metadata layout (spec §3.3, §4.5, §4.6).
//! A variable descriptor is read and written entirely as byte offsets into
//! a caller-owned region — no allocation, no pointer dereferences, bounds
//! checked at every field access (spec §9 "Raw-pointer descriptor
//! arithmetic").
//!
//! Grounded in `om_variable.c` (`original_source/Sources/OmFileFormatC/src`)
//! for the offset arithmetic, generalised from raw-pointer casts to
//! bounds-checked slice reads — this codebase's own `src/io/variable.rs`
//! wraps the same C functions over FFI instead of reimplementing the byte
//! layout, which doesn't fit a position-independent, zero-copy native
//! reader (see DESIGN.md).

pub mod reader;
pub mod writer;

pub use reader::VariableRef;
pub use writer::{write_array, write_array_size, write_scalar, write_scalar_size};

/// An absolute file offset and byte length of a child variable (spec §3.3).
/// Stored on disk as two little-endian `u64`s, `offset` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetSize {
    pub offset: u64,
    pub size: u64,
}

/// Which of the three on-disk shapes a descriptor's bytes take (spec §3.3,
/// §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLayout {
    Legacy,
    Scalar,
    Array,
}

/// Byte width of one serialised `OffsetSize` child entry.
pub(crate) const OFFSET_SIZE_WIDTH: usize = 16;
/// Scalar v3 header: `data_type, compression_type, length_of_name, number_of_children`.
pub(crate) const SCALAR_HEADER_SIZE: usize = 8;
/// Array v3 header: the scalar header plus `scale_factor, add_offset,
/// dimension_count, lut_size, lut_offset`.
pub(crate) const ARRAY_HEADER_SIZE: usize = 40;

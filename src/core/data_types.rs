use core::slice;
use std::mem;

use crate::errors::OmFilesRsError;

/// On-disk data-type enumeration (spec §6). Scalar kinds occupy
/// `NONE..=STRING`, array kinds occupy `INT8_ARRAY..=STRING_ARRAY` and are
/// contiguous by construction so a single range check distinguishes them
/// (spec §3.3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    None = 0,
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    Int64 = 7,
    Uint64 = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Int8Array = 12,
    Uint8Array = 13,
    Int16Array = 14,
    Uint16Array = 15,
    Int32Array = 16,
    Uint32Array = 17,
    Int64Array = 18,
    Uint64Array = 19,
    FloatArray = 20,
    DoubleArray = 21,
    StringArray = 22,
}

impl DataType {
    /// `true` for the numeric array kinds used to pick the array memory
    /// layout during dispatch (spec §4.5 layout table, `_memory_layout`):
    /// `data_type ∈ [INT8_ARRAY..DOUBLE_ARRAY]`. `StringArray` is
    /// deliberately excluded, matching the reference dispatch which only
    /// tests the numeric array range.
    pub fn is_numeric_array(&self) -> bool {
        matches!(
            self,
            DataType::Int8Array
                | DataType::Uint8Array
                | DataType::Int16Array
                | DataType::Uint16Array
                | DataType::Int32Array
                | DataType::Uint32Array
                | DataType::Int64Array
                | DataType::Uint64Array
                | DataType::FloatArray
                | DataType::DoubleArray
        )
    }

    /// Width in bytes of a single scalar value of this type, as used by the
    /// scalar descriptor's value field (spec §3.3, §4.6). `None` for `NONE`
    /// (zero-width value) is `Some(0)`; data types with no fixed scalar
    /// width (strings, arrays) return `None` (spec §7 `INVALID_DATA_TYPE`).
    pub fn scalar_value_width(&self) -> Option<u8> {
        match self {
            DataType::None => Some(0),
            DataType::Int8 | DataType::Uint8 => Some(1),
            DataType::Int16 | DataType::Uint16 => Some(2),
            DataType::Int32 | DataType::Uint32 | DataType::Float => Some(4),
            DataType::Int64 | DataType::Uint64 | DataType::Double => Some(8),
            DataType::String
            | DataType::Int8Array
            | DataType::Uint8Array
            | DataType::Int16Array
            | DataType::Uint16Array
            | DataType::Int32Array
            | DataType::Uint32Array
            | DataType::Int64Array
            | DataType::Uint64Array
            | DataType::FloatArray
            | DataType::DoubleArray
            | DataType::StringArray => None,
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = OmFilesRsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataType::None),
            1 => Ok(DataType::Int8),
            2 => Ok(DataType::Uint8),
            3 => Ok(DataType::Int16),
            4 => Ok(DataType::Uint16),
            5 => Ok(DataType::Int32),
            6 => Ok(DataType::Uint32),
            7 => Ok(DataType::Int64),
            8 => Ok(DataType::Uint64),
            9 => Ok(DataType::Float),
            10 => Ok(DataType::Double),
            11 => Ok(DataType::String),
            12 => Ok(DataType::Int8Array),
            13 => Ok(DataType::Uint8Array),
            14 => Ok(DataType::Int16Array),
            15 => Ok(DataType::Uint16Array),
            16 => Ok(DataType::Int32Array),
            17 => Ok(DataType::Uint32Array),
            18 => Ok(DataType::Int64Array),
            19 => Ok(DataType::Uint64Array),
            20 => Ok(DataType::FloatArray),
            21 => Ok(DataType::DoubleArray),
            22 => Ok(DataType::StringArray),
            _ => Err(OmFilesRsError::InvalidDataType),
        }
    }
}

/// Trait for types that can be stored as the element type of a numeric-array
/// variable.
pub trait OmFileArrayDataType {
    const DATA_TYPE_ARRAY: DataType;
}

/// Trait for types that can be stored as a scalar variable's value.
pub trait OmFileScalarDataType: Default {
    const DATA_TYPE_SCALAR: DataType;

    /// Creates a new instance from raw little-endian bytes.
    fn from_raw_bytes(bytes: &[u8]) -> Self {
        assert!(
            bytes.len() >= mem::size_of::<Self>(),
            "Buffer too small to contain type of size {}",
            mem::size_of::<Self>()
        );

        // Safety: the byte region is at least `size_of::<Self>()` long and
        // the platform is little-endian (or the caller has already
        // byte-swapped, per spec §4.6); this just reinterprets the bytes.
        unsafe {
            let mut result = Self::default();
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                &mut result as *mut Self as *mut u8,
                mem::size_of::<Self>(),
            );
            result
        }
    }

    /// Performs an operation with the raw little-endian bytes of this value.
    fn with_raw_bytes<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&[u8]) -> T,
    {
        // Safety: this creates a slice over `self`'s own representation.
        let bytes = unsafe {
            slice::from_raw_parts(self as *const Self as *const u8, mem::size_of::<Self>())
        };
        f(bytes)
    }
}

impl OmFileArrayDataType for i8 {
    const DATA_TYPE_ARRAY: DataType = DataType::Int8Array;
}
impl OmFileScalarDataType for i8 {
    const DATA_TYPE_SCALAR: DataType = DataType::Int8;
}

impl OmFileArrayDataType for u8 {
    const DATA_TYPE_ARRAY: DataType = DataType::Uint8Array;
}
impl OmFileScalarDataType for u8 {
    const DATA_TYPE_SCALAR: DataType = DataType::Uint8;
}

impl OmFileArrayDataType for i16 {
    const DATA_TYPE_ARRAY: DataType = DataType::Int16Array;
}
impl OmFileScalarDataType for i16 {
    const DATA_TYPE_SCALAR: DataType = DataType::Int16;
}

impl OmFileArrayDataType for u16 {
    const DATA_TYPE_ARRAY: DataType = DataType::Uint16Array;
}
impl OmFileScalarDataType for u16 {
    const DATA_TYPE_SCALAR: DataType = DataType::Uint16;
}

impl OmFileArrayDataType for i32 {
    const DATA_TYPE_ARRAY: DataType = DataType::Int32Array;
}
impl OmFileScalarDataType for i32 {
    const DATA_TYPE_SCALAR: DataType = DataType::Int32;
}

impl OmFileArrayDataType for u32 {
    const DATA_TYPE_ARRAY: DataType = DataType::Uint32Array;
}
impl OmFileScalarDataType for u32 {
    const DATA_TYPE_SCALAR: DataType = DataType::Uint32;
}

impl OmFileArrayDataType for i64 {
    const DATA_TYPE_ARRAY: DataType = DataType::Int64Array;
}
impl OmFileScalarDataType for i64 {
    const DATA_TYPE_SCALAR: DataType = DataType::Int64;
}

impl OmFileArrayDataType for u64 {
    const DATA_TYPE_ARRAY: DataType = DataType::Uint64Array;
}
impl OmFileScalarDataType for u64 {
    const DATA_TYPE_SCALAR: DataType = DataType::Uint64;
}

impl OmFileArrayDataType for f32 {
    const DATA_TYPE_ARRAY: DataType = DataType::FloatArray;
}
impl OmFileScalarDataType for f32 {
    const DATA_TYPE_SCALAR: DataType = DataType::Float;
}

impl OmFileArrayDataType for f64 {
    const DATA_TYPE_ARRAY: DataType = DataType::DoubleArray;
}
impl OmFileScalarDataType for f64 {
    const DATA_TYPE_SCALAR: DataType = DataType::Double;
}

impl OmFileScalarDataType for String {
    const DATA_TYPE_SCALAR: DataType = DataType::String;

    fn from_raw_bytes(bytes: &[u8]) -> Self {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn with_raw_bytes<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&[u8]) -> T,
    {
        f(self.as_bytes())
    }
}

/// The empty scalar payload for `DataType::None` (metadata-only variables
/// that exist purely to anchor a set of children).
#[derive(Debug, Clone, Copy, Default)]
pub struct OmNone;

impl OmFileScalarDataType for OmNone {
    const DATA_TYPE_SCALAR: DataType = DataType::None;

    fn from_raw_bytes(_bytes: &[u8]) -> Self {
        OmNone
    }

    fn with_raw_bytes<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&[u8]) -> T,
    {
        f(&[])
    }
}

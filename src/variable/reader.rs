//! Component E: the variable layout reader. A family of pure, bounds-checked
//! functions over a borrowed byte region (spec §4.5).

use crate::core::compression::CompressionType;
use crate::core::data_types::{DataType, OmFileScalarDataType};
use crate::errors::OmFilesRsError;

use super::{MemoryLayout, OffsetSize, ARRAY_HEADER_SIZE, OFFSET_SIZE_WIDTH, SCALAR_HEADER_SIZE};

fn need(bytes: &[u8], offset: usize, width: usize) -> Result<(), OmFilesRsError> {
    let end = offset + width;
    if bytes.len() < end {
        return Err(OmFilesRsError::DescriptorTooShort {
            needed: end,
            available: bytes.len(),
        });
    }
    Ok(())
}

fn read_u8(bytes: &[u8], offset: usize) -> Result<u8, OmFilesRsError> {
    need(bytes, offset, 1)?;
    Ok(bytes[offset])
}

fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16, OmFilesRsError> {
    need(bytes, offset, 2)?;
    Ok(u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()))
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32, OmFilesRsError> {
    need(bytes, offset, 4)?;
    Ok(u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()))
}

fn read_u64_le(bytes: &[u8], offset: usize) -> Result<u64, OmFilesRsError> {
    need(bytes, offset, 8)?;
    Ok(u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap()))
}

fn read_f32_le(bytes: &[u8], offset: usize) -> Result<f32, OmFilesRsError> {
    need(bytes, offset, 4)?;
    Ok(f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()))
}

/// A borrowed, bounds-checked view over a run of little-endian `u64`s
/// embedded in a descriptor (spec §3.3 "dimension sequences are borrowed
/// views"). Element access re-reads the underlying bytes rather than
/// reinterpreting them as `&[u64]` in place, since a sub-slice of a
/// caller-owned byte buffer has no alignment guarantee.
#[derive(Debug, Clone, Copy)]
pub struct U64View<'a> {
    bytes: &'a [u8],
}

impl<'a> U64View<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len() / 8
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        let start = index * 8;
        if start + 8 > self.bytes.len() {
            return None;
        }
        Some(u64::from_le_bytes(self.bytes[start..start + 8].try_into().unwrap()))
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + 'a {
        let bytes = self.bytes;
        (0..bytes.len() / 8).map(move |i| {
            let start = i * 8;
            u64::from_le_bytes(bytes[start..start + 8].try_into().unwrap())
        })
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }
}

impl<'a> PartialEq<[u64]> for U64View<'a> {
    fn eq(&self, other: &[u64]) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter().copied()).all(|(a, b)| a == b)
    }
}

impl<'a, const N: usize> PartialEq<[u64; N]> for U64View<'a> {
    fn eq(&self, other: &[u64; N]) -> bool {
        self.len() == N && self.iter().zip(other.iter().copied()).all(|(a, b)| a == b)
    }
}

/// A variable descriptor borrowed from a byte region (spec §3.3). Every
/// getter dispatches once on [`MemoryLayout`] and re-derives its field
/// offset from the preceding variable-width fields (spec §9 "Polymorphism
/// across three layouts").
#[derive(Debug, Clone, Copy)]
pub struct VariableRef<'a> {
    bytes: &'a [u8],
}

impl<'a> VariableRef<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Spec §4.5 / §8 invariant 8.
    pub fn memory_layout(&self) -> Result<MemoryLayout, OmFilesRsError> {
        if self.bytes.len() >= 3
            && self.bytes[0] == b'O'
            && self.bytes[1] == b'M'
            && (self.bytes[2] == 1 || self.bytes[2] == 2)
        {
            return Ok(MemoryLayout::Legacy);
        }
        let data_type = DataType::try_from(read_u8(self.bytes, 0)?)?;
        Ok(if data_type.is_numeric_array() {
            MemoryLayout::Array
        } else {
            MemoryLayout::Scalar
        })
    }

    pub fn get_type(&self) -> Result<DataType, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => Ok(DataType::FloatArray),
            MemoryLayout::Scalar | MemoryLayout::Array => {
                DataType::try_from(read_u8(self.bytes, 0)?)
            }
        }
    }

    pub fn get_compression(&self) -> Result<CompressionType, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => {
                let version = read_u8(self.bytes, 2)?;
                if version == 1 {
                    Ok(CompressionType::Pfor16bitDelta2dLegacy)
                } else {
                    CompressionType::try_from(read_u8(self.bytes, 3)?)
                }
            }
            MemoryLayout::Scalar | MemoryLayout::Array => {
                CompressionType::try_from(read_u8(self.bytes, 1)?)
            }
        }
    }

    pub fn get_scale_factor(&self) -> Result<f32, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => read_f32_le(self.bytes, 4),
            MemoryLayout::Scalar => Ok(1.0),
            MemoryLayout::Array => read_f32_le(self.bytes, 8),
        }
    }

    pub fn get_add_offset(&self) -> Result<f32, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy | MemoryLayout::Scalar => Ok(0.0),
            MemoryLayout::Array => read_f32_le(self.bytes, 12),
        }
    }

    pub fn get_number_of_children(&self) -> Result<u32, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => Ok(0),
            MemoryLayout::Scalar | MemoryLayout::Array => read_u32_le(self.bytes, 4),
        }
    }

    /// Out-of-range `n_child` returns a zero-valued entry (spec §4.5).
    pub fn get_child(&self, n_child: u32) -> Result<OffsetSize, OmFilesRsError> {
        let header_size = match self.memory_layout()? {
            MemoryLayout::Legacy => return Ok(OffsetSize::default()),
            MemoryLayout::Scalar => SCALAR_HEADER_SIZE,
            MemoryLayout::Array => ARRAY_HEADER_SIZE,
        };
        if n_child >= self.get_number_of_children()? {
            return Ok(OffsetSize::default());
        }
        let base = header_size + n_child as usize * OFFSET_SIZE_WIDTH;
        Ok(OffsetSize {
            offset: read_u64_le(self.bytes, base)?,
            size: read_u64_le(self.bytes, base + 8)?,
        })
    }

    pub fn get_dimensions(&self) -> Result<U64View<'a>, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => {
                need(self.bytes, 8, 16)?;
                Ok(U64View { bytes: &self.bytes[8..24] })
            }
            MemoryLayout::Scalar => Ok(U64View { bytes: &[] }),
            MemoryLayout::Array => {
                let (base, dim_count) = self.array_dimensions_region()?;
                need(self.bytes, base, dim_count * 8)?;
                Ok(U64View { bytes: &self.bytes[base..base + dim_count * 8] })
            }
        }
    }

    pub fn get_chunks(&self) -> Result<U64View<'a>, OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => {
                need(self.bytes, 24, 16)?;
                Ok(U64View { bytes: &self.bytes[24..40] })
            }
            MemoryLayout::Scalar => Ok(U64View { bytes: &[] }),
            MemoryLayout::Array => {
                let (dims_base, dim_count) = self.array_dimensions_region()?;
                let base = dims_base + dim_count * 8;
                need(self.bytes, base, dim_count * 8)?;
                Ok(U64View { bytes: &self.bytes[base..base + dim_count * 8] })
            }
        }
    }

    pub fn get_name(&self) -> Result<&'a [u8], OmFilesRsError> {
        match self.memory_layout()? {
            MemoryLayout::Legacy => Ok(&[]),
            MemoryLayout::Scalar => {
                let length_of_name = read_u16_le(self.bytes, 2)? as usize;
                let n_children = self.get_number_of_children()? as usize;
                let data_type = self.get_type()?;
                let value_width = data_type
                    .scalar_value_width()
                    .ok_or(OmFilesRsError::InvalidDataType)? as usize;
                let base = SCALAR_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH + value_width;
                need(self.bytes, base, length_of_name)?;
                Ok(&self.bytes[base..base + length_of_name])
            }
            MemoryLayout::Array => {
                let length_of_name = read_u16_le(self.bytes, 2)? as usize;
                let (dims_base, dim_count) = self.array_dimensions_region()?;
                let base = dims_base + 2 * dim_count * 8;
                need(self.bytes, base, length_of_name)?;
                Ok(&self.bytes[base..base + length_of_name])
            }
        }
    }

    /// Copies out the scalar value, failing unless this is a scalar
    /// descriptor whose `data_type` matches `T` (spec §4.5, §7
    /// `INVALID_DATA_TYPE`).
    pub fn get_scalar<T: OmFileScalarDataType>(&self) -> Result<T, OmFilesRsError> {
        if self.memory_layout()? != MemoryLayout::Scalar {
            return Err(OmFilesRsError::InvalidDataType);
        }
        let data_type = self.get_type()?;
        if data_type != T::DATA_TYPE_SCALAR {
            return Err(OmFilesRsError::InvalidDataType);
        }
        let width = data_type
            .scalar_value_width()
            .ok_or(OmFilesRsError::InvalidDataType)? as usize;
        let n_children = self.get_number_of_children()? as usize;
        let base = SCALAR_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH;
        need(self.bytes, base, width)?;
        Ok(T::from_raw_bytes(&self.bytes[base..base + width]))
    }

    /// `(offset of the dimensions array, dimension_count)` for an array
    /// descriptor — shared by `get_dimensions`, `get_chunks`, `get_name`.
    fn array_dimensions_region(&self) -> Result<(usize, usize), OmFilesRsError> {
        let n_children = self.get_number_of_children()? as usize;
        let dimension_count = read_u64_le(self.bytes, 16)? as usize;
        Ok((ARRAY_HEADER_SIZE + n_children * OFFSET_SIZE_WIDTH, dimension_count))
    }
}

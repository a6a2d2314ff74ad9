//! S5, S6 and invariants 6-8 for the variable layout reader/writer (spec
//! §4.5, §4.6, §8).

use om_file_core::core::compression::CompressionType;
use om_file_core::core::data_types::DataType;
use om_file_core::variable::{
    write_array, write_array_size, write_scalar, write_scalar_size, MemoryLayout, OffsetSize,
    VariableRef,
};

fn legacy_bytes(version: u8, compression_byte: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; 40];
    bytes[0] = b'O';
    bytes[1] = b'M';
    bytes[2] = version;
    bytes[3] = compression_byte;
    bytes[4..8].copy_from_slice(&100f32.to_le_bytes());
    bytes[8..16].copy_from_slice(&10u64.to_le_bytes());
    bytes[16..24].copy_from_slice(&20u64.to_le_bytes());
    bytes[24..32].copy_from_slice(&5u64.to_le_bytes());
    bytes[32..40].copy_from_slice(&10u64.to_le_bytes());
    bytes
}

/// S6: legacy v1 header, magic `'O','M',1`.
#[test]
fn s6_legacy_v1_header_round_trips_through_the_reader() {
    let bytes = legacy_bytes(1, 0);
    let view = VariableRef::new(&bytes);

    assert_eq!(view.memory_layout().unwrap(), MemoryLayout::Legacy);
    assert_eq!(view.get_type().unwrap(), DataType::FloatArray);
    assert_eq!(view.get_compression().unwrap(), CompressionType::Pfor16bitDelta2dLegacy);
    assert_eq!(view.get_dimensions().unwrap(), [10u64, 20]);
    assert_eq!(view.get_chunks().unwrap(), [5u64, 10]);
    assert_eq!(view.get_scale_factor().unwrap(), 100.0);
    assert_eq!(view.get_add_offset().unwrap(), 0.0);
    assert_eq!(view.get_number_of_children().unwrap(), 0);
    assert_eq!(view.get_name().unwrap(), b"");
    assert_eq!(view.get_child(0).unwrap(), OffsetSize::default());
}

/// Legacy v2 carries its compression byte explicitly rather than implying
/// `PFOR_16BIT_DELTA2D` (spec §3.3).
#[test]
fn legacy_v2_header_reads_its_own_compression_byte() {
    let bytes = legacy_bytes(2, CompressionType::Fpxdec32 as u8);
    let view = VariableRef::new(&bytes);

    assert_eq!(view.memory_layout().unwrap(), MemoryLayout::Legacy);
    assert_eq!(view.get_compression().unwrap(), CompressionType::Fpxdec32);
}

/// S5: scalar writer with `data_type=FLOAT`, `value=3.5`, `name="temp"`,
/// two children. Expected written size = 8 + 32 + 4 + 4 = 48.
#[test]
fn s5_scalar_writer_matches_the_spec_worked_example() {
    let children = [
        OffsetSize { offset: 1000, size: 200 },
        OffsetSize { offset: 2000, size: 300 },
    ];
    let name = b"temp";

    let predicted_size = write_scalar_size(name.len(), children.len() as u32, DataType::Float);
    assert_eq!(predicted_size, 48);

    let mut dst = vec![0u8; predicted_size];
    let result = write_scalar(&mut dst, 500, &children, name, &3.5f32);
    assert_eq!(result.size, 48);
    assert_eq!(result.offset, 500);

    let view = VariableRef::new(&dst);
    assert_eq!(view.memory_layout().unwrap(), MemoryLayout::Scalar);
    assert_eq!(view.get_type().unwrap(), DataType::Float);
    assert_eq!(view.get_scalar::<f32>().unwrap(), 3.5);
    assert_eq!(view.get_name().unwrap(), name);
    assert_eq!(view.get_number_of_children().unwrap(), 2);
    assert_eq!(view.get_child(0).unwrap(), children[0]);
    assert_eq!(view.get_child(1).unwrap(), children[1]);
    assert_eq!(view.get_child(2).unwrap(), OffsetSize::default());
}

/// Invariant 6: `write_*_size` must equal the `size` field `write_*` returns,
/// across a spread of name lengths, child counts and data types.
#[test]
fn invariant_write_size_matches_the_returned_size() {
    for n_children in [0u32, 1, 3] {
        for name_len in [0usize, 1, 10] {
            let children: Vec<OffsetSize> =
                (0..n_children).map(|i| OffsetSize { offset: i as u64, size: i as u64 + 1 }).collect();
            let name = vec![b'x'; name_len];

            let predicted = write_scalar_size(name_len, n_children, DataType::Int64);
            let mut dst = vec![0u8; predicted];
            let result = write_scalar(&mut dst, 0, &children, &name, &42i64);
            assert_eq!(predicted as u64, result.size);

            let dim_count = 3u64;
            let predicted_array = write_array_size(name_len, n_children, dim_count);
            let mut dst_array = vec![0u8; predicted_array];
            let dims = vec![4u64, 8, 2];
            let result_array = write_array::<f64>(
                &mut dst_array,
                0,
                &children,
                &name,
                CompressionType::Fpxdec32,
                1.0,
                0.0,
                &dims,
                &dims,
                0,
                0,
            );
            assert_eq!(predicted_array as u64, result_array.size);
        }
    }
}

/// Invariant 7: every getter applied to a freshly written descriptor
/// returns back exactly what was written.
#[test]
fn invariant_array_reader_writer_consistency() {
    let children = [OffsetSize { offset: 64, size: 128 }];
    let name = b"precipitation";
    let dims = [12u64, 34, 56];
    let chunks = [4u64, 4, 8];

    let size = write_array_size(name.len(), children.len() as u32, dims.len() as u64);
    let mut dst = vec![0u8; size];
    let result = write_array::<i32>(
        &mut dst,
        777,
        &children,
        name,
        CompressionType::P4nzdec256logarithmic,
        2.5,
        -1.5,
        &dims,
        &chunks,
        4096,
        128,
    );
    assert_eq!(result.offset, 777);
    assert_eq!(result.size, size as u64);

    let view = VariableRef::new(&dst);
    assert_eq!(view.memory_layout().unwrap(), MemoryLayout::Array);
    assert_eq!(view.get_type().unwrap(), DataType::Int32Array);
    assert_eq!(view.get_compression().unwrap(), CompressionType::P4nzdec256logarithmic);
    assert_eq!(view.get_scale_factor().unwrap(), 2.5);
    assert_eq!(view.get_add_offset().unwrap(), -1.5);
    assert_eq!(view.get_dimensions().unwrap(), dims);
    assert_eq!(view.get_chunks().unwrap(), chunks);
    assert_eq!(view.get_name().unwrap(), name);
    assert_eq!(view.get_number_of_children().unwrap(), 1);
    assert_eq!(view.get_child(0).unwrap(), children[0]);
}

/// Invariant 8: dispatch only treats `'O','M',{1|2}` as legacy; anything
/// else falls through to the data-type range check.
#[test]
fn invariant_layout_dispatch_follows_the_magic_and_data_type_rules() {
    assert_eq!(VariableRef::new(&legacy_bytes(1, 0)).memory_layout().unwrap(), MemoryLayout::Legacy);
    assert_eq!(VariableRef::new(&legacy_bytes(2, 0)).memory_layout().unwrap(), MemoryLayout::Legacy);

    // 'O','M' followed by a version that is neither 1 nor 2 is not legacy;
    // it falls through to the v3 data_type byte at the same offset 0, which
    // here is b'O' = 79, an invalid data_type.
    let not_legacy = legacy_bytes(3, 0);
    assert!(VariableRef::new(&not_legacy).memory_layout().is_err());

    let scalar_size = write_scalar_size(0, 0, DataType::Double);
    let mut scalar_bytes = vec![0u8; scalar_size];
    write_scalar(&mut scalar_bytes, 0, &[], &[], &7.0f64);
    assert_eq!(VariableRef::new(&scalar_bytes).memory_layout().unwrap(), MemoryLayout::Scalar);

    let array_size = write_array_size(0, 0, 1);
    let mut array_bytes = vec![0u8; array_size];
    write_array::<u8>(&mut array_bytes, 0, &[], &[], CompressionType::P4nzdec256, 1.0, 0.0, &[1], &[1], 0, 0);
    assert_eq!(VariableRef::new(&array_bytes).memory_layout().unwrap(), MemoryLayout::Array);
}

#[test]
fn get_scalar_rejects_a_mismatched_data_type() {
    let size = write_scalar_size(0, 0, DataType::Int32);
    let mut dst = vec![0u8; size];
    write_scalar(&mut dst, 0, &[], &[], &42i32);

    let view = VariableRef::new(&dst);
    assert!(view.get_scalar::<f32>().is_err());
}

#[test]
fn descriptor_too_short_is_reported_rather_than_panicking() {
    let truncated = vec![DataType::Int8 as u8, CompressionType::None as u8, 0, 0];
    let view = VariableRef::new(&truncated);
    assert!(view.get_number_of_children().is_err());
}

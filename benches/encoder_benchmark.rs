use criterion::{black_box, criterion_group, criterion_main, Criterion};
use om_file_core::core::compression::CompressionType;
use om_file_core::core::data_types::DataType;
use om_file_core::encoder::Encoder;

const DIM0_SIZE: u64 = 1024;
const DIM1_SIZE: u64 = 1024;
const CHUNK0_SIZE: u64 = 20;
const CHUNK1_SIZE: u64 = 20;

pub fn benchmark_write_single_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_single_chunk");
    group.sample_size(20);

    let dimensions = vec![DIM0_SIZE, DIM1_SIZE];
    let chunks = vec![CHUNK0_SIZE, CHUNK1_SIZE];
    let data: Vec<f32> = (0..DIM0_SIZE * DIM1_SIZE).map(|x| x as f32).collect();
    let offset = vec![0u64, 0];

    for compression in [
        CompressionType::P4nzdec256,
        CompressionType::Fpxdec32,
        CompressionType::P4nzdec256logarithmic,
    ] {
        let encoder = Encoder::new(1.0, compression, DataType::Float, &dimensions, &chunks, 256);
        let chunk_buffer_size = encoder.chunk_buffer_size() as usize;
        let mut out = vec![0u8; chunk_buffer_size];
        let mut chunk_buffer = vec![0u8; chunk_buffer_size];

        group.bench_function(format!("{compression:?}"), |b| {
            b.iter(|| {
                for chunk_index in 0..encoder.number_of_chunks() {
                    black_box(encoder.write_single_chunk(
                        &data,
                        &dimensions,
                        &offset,
                        &dimensions,
                        chunk_index,
                        chunk_index,
                        &mut out,
                        &mut chunk_buffer,
                    ));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_write_single_chunk);
criterion_main!(benches);

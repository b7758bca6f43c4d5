//! Benchmarks for the LZ4 block and frame codecs.
//!
//! Run with: `cargo bench -p assetpack-lz4`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use assetpack_lz4::block::{compress_block, decompress_block, max_compressed_size};
use assetpack_lz4::{BlockSize, FrameConfig, FrameDecoder, FrameEncoder};

/// Generate test data with varying compressibility.
fn generate_test_data(size: usize, compressibility: f64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::with_capacity(size);

    if compressibility > 0.9 {
        // Highly repetitive data
        let pattern = b"ABCDEFGHIJKLMNOP";
        while data.len() < size {
            data.extend_from_slice(pattern);
        }
        data.truncate(size);
    } else if compressibility > 0.5 {
        // Asset-like text: manifest lines with some noise
        let phrases: &[&[u8]] = &[
            b"\"path\": \"textures/terrain/grass_albedo.ktx2\", ",
            b"\"path\": \"shaders/forward/pbr.wgsl\", ",
            b"\"size\": 1048576, \"mips\": 11, ",
        ];
        while data.len() < size {
            if rng.gen_bool(compressibility) {
                let phrase = phrases[rng.gen_range(0..phrases.len())];
                data.extend_from_slice(phrase);
            } else {
                data.push(rng.r#gen::<u8>());
            }
        }
        data.truncate(size);
    } else {
        // Random/incompressible data
        data.resize(size, 0);
        rng.fill(&mut data[..]);
    }

    data
}

fn bench_block_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_block_compress");

    for size in [4 * 1024, 64 * 1024, 256 * 1024] {
        let data = generate_test_data(size, 0.7);
        let mut output = vec![0u8; max_compressed_size(size)];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| compress_block(black_box(data), &mut output).unwrap())
        });
    }

    group.finish();
}

fn bench_block_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_block_decompress");

    for size in [4 * 1024, 64 * 1024, 256 * 1024] {
        let data = generate_test_data(size, 0.7);
        let mut compressed = vec![0u8; max_compressed_size(size)];
        let len = compress_block(&data, &mut compressed).unwrap();
        compressed.truncate(len);
        let mut output = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &compressed,
            |b, compressed| b.iter(|| decompress_block(black_box(compressed), &mut output).unwrap()),
        );
    }

    group.finish();
}

fn bench_frame_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_frame_block_size");
    let size = 4 * 1024 * 1024;
    let data = generate_test_data(size, 0.7);
    group.throughput(Throughput::Bytes(size as u64));

    for block_size in [
        BlockSize::Max64KiB,
        BlockSize::Max256KiB,
        BlockSize::Max1MiB,
        BlockSize::Max4MiB,
    ] {
        let encoder = FrameEncoder::with_config(FrameConfig::default().with_block_size(block_size));
        group.bench_with_input(
            BenchmarkId::new("compress", block_size),
            &data,
            |b, data| b.iter(|| encoder.encode(black_box(data)).unwrap()),
        );

        let frame = encoder.encode(&data).unwrap();
        let decoder = FrameDecoder::new();
        group.bench_with_input(
            BenchmarkId::new("decompress", block_size),
            &frame,
            |b, frame| b.iter(|| decoder.decode(black_box(frame), Some(size)).unwrap()),
        );
    }

    group.finish();
}

fn bench_frame_checksums(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_frame_checksums");
    let size = 1024 * 1024;
    let data = generate_test_data(size, 0.95);
    group.throughput(Throughput::Bytes(size as u64));

    let plain = FrameEncoder::new();
    let checked = FrameEncoder::with_config(
        FrameConfig::default()
            .with_block_checksum(true)
            .with_content_checksum(true),
    );

    for (name, encoder) in [("plain", &plain), ("checked", &checked)] {
        let frame = encoder.encode(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("decompress", name), &frame, |b, frame| {
            b.iter(|| FrameDecoder::new().decode(black_box(frame), Some(size)).unwrap())
        });
    }

    group.finish();
}

fn bench_vs_lz4_flex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_vs_lz4_flex");
    let size = 64 * 1024;
    let data = generate_test_data(size, 0.7);
    group.throughput(Throughput::Bytes(size as u64));

    let mut output = vec![0u8; max_compressed_size(size)];
    group.bench_with_input(BenchmarkId::new("assetpack", "compress"), &data, |b, data| {
        b.iter(|| compress_block(black_box(data), &mut output).unwrap())
    });
    group.bench_with_input(BenchmarkId::new("lz4_flex", "compress"), &data, |b, data| {
        b.iter(|| lz4_flex::compress(black_box(data)))
    });

    let compressed = lz4_flex::compress(&data);
    let mut decoded = vec![0u8; size];
    group.bench_with_input(
        BenchmarkId::new("assetpack", "decompress"),
        &compressed,
        |b, compressed| b.iter(|| decompress_block(black_box(compressed), &mut decoded).unwrap()),
    );
    group.bench_with_input(
        BenchmarkId::new("lz4_flex", "decompress"),
        &compressed,
        |b, compressed| b.iter(|| lz4_flex::decompress(black_box(compressed), size).unwrap()),
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_block_compress,
    bench_block_decompress,
    bench_frame_block_sizes,
    bench_frame_checksums,
    bench_vs_lz4_flex,
);
criterion_main!(benches);

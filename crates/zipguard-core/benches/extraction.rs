//! Benchmarks for zipguard-core extraction.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use std::io::Cursor;
use std::io::Write;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;
use zipguard_core::ExtractOptions;
use zipguard_core::extract;
use zipguard_core::list_entries;

/// Creates a ZIP archive with many small files.
fn create_many_small_files_zip(file_count: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for i in 0..file_count {
        zip.start_file(format!("dir{}/file{i:04}.txt", i % 16), options)
            .unwrap();
        zip.write_all(format!("content{i}").as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Creates a ZIP archive with a single file of `size_bytes`.
fn create_single_file_zip(size_bytes: usize, method: zip::CompressionMethod) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    zip.start_file("large_file.bin", options).unwrap();
    // Mildly compressible pattern
    let data: Vec<u8> = (0..size_bytes).map(|i| (i % 251) as u8).collect();
    zip.write_all(&data).unwrap();

    zip.finish().unwrap().into_inner()
}

fn extract_fresh(data: &[u8]) {
    let temp = TempDir::new().unwrap();
    let report = extract(
        Cursor::new(data),
        temp.path(),
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(report.is_success());
}

fn benchmark_parse_central_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_central_directory");

    for file_count in [100, 1000, 10000] {
        let zip_data = create_many_small_files_zip(file_count);
        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &zip_data,
            |b, data| b.iter(|| list_entries(Cursor::new(data.as_slice())).unwrap()),
        );
    }

    group.finish();
}

fn benchmark_many_small_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_small_files");
    group.sample_size(20);

    for file_count in [100, 1000] {
        let zip_data = create_many_small_files_zip(file_count);
        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &zip_data,
            |b, data| b.iter(|| extract_fresh(data)),
        );
    }

    group.finish();
}

fn benchmark_compression_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_methods");

    for size_mb in [1, 10] {
        let size_bytes = size_mb * 1024 * 1024;
        group.throughput(Throughput::Bytes(size_bytes as u64));

        for (label, method) in [
            ("stored", zip::CompressionMethod::Stored),
            ("deflate", zip::CompressionMethod::Deflated),
        ] {
            let zip_data = create_single_file_zip(size_bytes, method);
            group.bench_with_input(
                BenchmarkId::new(label, format!("{size_mb}MB")),
                &zip_data,
                |b, data| b.iter(|| extract_fresh(data)),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_central_directory,
    benchmark_many_small_files,
    benchmark_compression_methods
);
criterion_main!(benches);

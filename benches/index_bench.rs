use criterion::{black_box, criterion_group, criterion_main, Criterion};
use odcpio::index::ArchiveIndex;
use std::io::Cursor;

fn synthetic_archive(entries: usize, payload: usize) -> Vec<u8> {
    let data = vec![0x5Au8; payload];
    let mut out = Vec::new();
    let mut push = |name: &str, data: &[u8]| {
        out.extend_from_slice(b"070707");
        for v in [0u32, 0, 0o100644, 0, 0, 1, 0] {
            out.extend_from_slice(format!("{v:06o}").as_bytes());
        }
        out.extend_from_slice(format!("{:011o}", 0).as_bytes());
        out.extend_from_slice(format!("{:06o}", name.len() + 1).as_bytes());
        out.extend_from_slice(format!("{:011o}", data.len()).as_bytes());
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.extend_from_slice(data);
    };
    for i in 0..entries {
        push(&format!("dir/file_{i:05}.bin"), &data);
    }
    push("description", b"benchmark archive");
    push("TRAILER!!!", b"");
    out
}

fn bench_index(c: &mut Criterion) {
    let small = synthetic_archive(1000, 64);
    let large = synthetic_archive(100, 64 * 1024);

    c.bench_function("index_1000_small_entries", |b| {
        b.iter(|| ArchiveIndex::open(Cursor::new(black_box(&small[..]))).unwrap().len())
    });
    c.bench_function("index_100_large_entries", |b| {
        b.iter(|| ArchiveIndex::open(Cursor::new(black_box(&large[..]))).unwrap().len())
    });
}

fn bench_extract(c: &mut Criterion) {
    let bytes = synthetic_archive(1000, 64);
    let mut idx = ArchiveIndex::open(Cursor::new(&bytes[..])).unwrap();

    c.bench_function("read_description", |b| {
        b.iter(|| idx.read_description().unwrap())
    });
}

criterion_group!(benches, bench_index, bench_extract);
criterion_main!(benches);

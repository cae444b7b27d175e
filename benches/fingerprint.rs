use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memory_forensics::{Config, Fingerprint, ForensicsEngine, MockBackend, Permissions};

fn bench_fingerprint_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_compute");
    for size in [4096usize, 65536, 1 << 20] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Fingerprint::compute(black_box(data)));
        });
    }
    group.finish();
}

fn bench_snapshot_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_capture");
    for region_count in [16usize, 128] {
        let (backend, controller) = MockBackend::new();
        for i in 0..region_count {
            controller.add_region(
                1,
                0x10000 + i * 0x20000,
                Permissions::read_write(),
                vec![i as u8; 0x10000],
            );
        }
        let engine = ForensicsEngine::with_backend(Box::new(backend), Config::default()).unwrap();
        let handle = engine.attach(1).unwrap();

        group.throughput(Throughput::Bytes((region_count * 0x10000) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(region_count),
            &handle,
            |b, handle| {
                b.iter(|| engine.create_snapshot(black_box(handle)).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fingerprint_compute, bench_snapshot_capture);
criterion_main!(benches);

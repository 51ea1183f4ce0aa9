use criterion::{black_box, criterion_group, criterion_main, Criterion};
use facewhiz_faceid::{euclidean, identify, SnapshotEntry};

fn random_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut v = Vec::with_capacity(dim);
    let mut state = seed;
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        v.push(((state >> 33) as f32) / (u32::MAX as f32) - 0.5);
    }
    v
}

fn make_snapshot(dim: usize, descriptors: usize) -> Vec<SnapshotEntry> {
    (0..descriptors)
        .map(|i| SnapshotEntry {
            person_id: format!("person-{:03}", i / 2),
            descriptor_id: format!("descriptor-{i:04}"),
            vector: random_vec(dim, i as u64 + 1),
        })
        .collect()
}

fn bench_euclidean(c: &mut Criterion) {
    let a = random_vec(128, 1);
    let b = random_vec(128, 2);

    c.bench_function("euclidean_128d", |bench| {
        bench.iter(|| black_box(euclidean(black_box(&a), black_box(&b))));
    });
}

fn bench_identify(c: &mut Criterion) {
    let snapshot = make_snapshot(128, 200);
    let probe = random_vec(128, 999);

    c.bench_function("identify_128d_200descriptors", |bench| {
        bench.iter(|| {
            let _ = black_box(identify(black_box(&probe), 0.6, &snapshot));
        });
    });
}

criterion_group!(benches, bench_euclidean, bench_identify);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lattice_types::{BlockHash, Root};
use lattice_work::{validate_work, WorkBlockKind, WorkThresholds};

fn bench_validate(c: &mut Criterion) {
    let root = Root::from(BlockHash::new([0x42; 32]));
    let thresholds = WorkThresholds::new();
    let threshold = thresholds.threshold_for(WorkBlockKind::ReceiveOrOpen);

    c.bench_function("validate_work", |b| {
        b.iter(|| validate_work(black_box(&root), black_box(0xDEAD_BEEF), threshold))
    });
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);

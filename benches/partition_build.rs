use criterion::{black_box, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use spartan::{DistributedMatrix, Partitioning, random_triplets, spmv};

fn bench_build_and_metrics(c: &mut Criterion) {
    let n = 2000;
    let procs = 8;
    let mut rng = StdRng::seed_from_u64(7);
    let triplets = random_triplets(n, n, 0.005, &mut rng).unwrap();

    for scheme in [Partitioning::Cyclic, Partitioning::Block, Partitioning::Random] {
        let name = format!("build {:?}", scheme);
        c.bench_function(&name, |ben| {
            let mut a = DistributedMatrix::<f64>::with_procs(n, n, procs);
            a.set_partitioning(scheme.clone());
            a.set_seed(Some(1));
            ben.iter(|| a.set_from_triplets(black_box(triplets.iter().copied())).unwrap())
        });
    }

    let mut a = DistributedMatrix::<f64>::with_procs(n, n, procs);
    a.set_from_triplets(triplets.iter().copied()).unwrap();

    c.bench_function("communication volume", |ben| {
        ben.iter(|| black_box(a.communication_volume().unwrap()))
    });

    c.bench_function("load imbalance", |ben| ben.iter(|| black_box(a.load_imbalance().unwrap())));

    let x = vec![1.0; n];
    c.bench_function("spmv", |ben| ben.iter(|| spmv(black_box(&a), black_box(&x)).unwrap()));
}

criterion_group!(benches, bench_build_and_metrics);
criterion_main!(benches);

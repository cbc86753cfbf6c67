use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pindex::popularity::{self, NoopProgress};
use pindex::sparse::SparseColMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(items: usize, users: usize, density: f64) -> SparseColMatrix {
    let mut rng = StdRng::seed_from_u64(0x51AB + users as u64);
    let mut entries = Vec::new();
    for user in 0..users {
        // Every user owns at least one item; the rest by density.
        entries.push((rng.gen_range(0..items) as u32, user as u32, 1.0));
        for item in 0..items {
            if rng.r#gen::<f64>() < density {
                entries.push((item as u32, user as u32, 1.0));
            }
        }
    }
    SparseColMatrix::from_triplets(items, users, &entries).unwrap()
}

fn benchmark_intersection(c: &mut Criterion) {
    let matrix = random_matrix(2000, 500, 0.05);

    let mut group = c.benchmark_group("sparse_intersection");
    group.throughput(Throughput::Elements(matrix.cols() as u64));
    group.bench_function("one_column_vs_all", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for j in 0..matrix.cols() {
                total += matrix.intersection_count(black_box(0), black_box(j));
            }
            black_box(total);
        });
    });
    group.finish();
}

fn benchmark_pindex(c: &mut Criterion) {
    let sizes = [100_usize, 300];
    let mut group = c.benchmark_group("pindex");
    for &users in sizes.iter() {
        let matrix = random_matrix(1000, users, 0.05);
        group.throughput(Throughput::Elements(users as u64));
        group.bench_with_input(BenchmarkId::new("compute_all", users), &matrix, |b, m| {
            b.iter(|| {
                let values = popularity::compute_all(black_box(m), &NoopProgress).unwrap();
                black_box(values);
            });
        });
    }
    group.finish();
}

criterion_group!(intersection, benchmark_intersection, benchmark_pindex);
criterion_main!(intersection);

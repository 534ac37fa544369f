//! Benchmark census construction and proof verification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shadow_atlas::{
    generate_proof, verify_proof, BoundaryType, CensusBuilder, CountryRegistry, DistrictInput,
    Fr, Geometry, PairHash, PoseidonPairHash,
};

const COUNTRIES: &[&str] = &["US", "CA", "GB", "FR", "DE", "NZ", "AU", "JP"];

fn synthetic_districts(count: usize) -> Vec<DistrictInput> {
    (0..count)
        .map(|i| {
            let country = COUNTRIES[i % COUNTRIES.len()];
            let lon = -170.0 + (i as f64 * 0.37) % 340.0;
            let lat = -80.0 + (i as f64 * 0.21) % 160.0;
            DistrictInput {
                id: format!("{}-R{}-{:05}", country, i % 4, i),
                name: format!("Synthetic {}", i),
                country: country.to_string(),
                region: format!("R{}", i % 4),
                boundary_type: BoundaryType::ElectoralDistrict,
                authority: 1,
                geometry: Geometry::Polygon(vec![vec![
                    [lon, lat],
                    [lon + 0.1, lat],
                    [lon + 0.1, lat + 0.1],
                    [lon, lat],
                ]]),
            }
        })
        .collect()
}

fn bench_pair_hash(c: &mut Criterion) {
    let hasher = PoseidonPairHash::new();
    let left = Fr::from(12345u64);
    let right = Fr::from(67890u64);

    c.bench_function("poseidon_pair_hash", |b| {
        b.iter(|| black_box(hasher.hash_pair(black_box(left), black_box(right))))
    });
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("census_build");
    group.sample_size(10);

    for size in [8usize, 32, 128].iter() {
        let districts = synthetic_districts(*size);
        for parallel in [false, true] {
            let builder = CensusBuilder::new(PoseidonPairHash::new(), CountryRegistry::builtin())
                .parallel(parallel);
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, size), &districts, |b, districts| {
                b.iter(|| black_box(builder.build(districts).map(|tree| tree.global_root())))
            });
        }
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let hasher = PoseidonPairHash::new();
    let districts = synthetic_districts(64);
    let builder = CensusBuilder::new(hasher.clone(), CountryRegistry::builtin());
    let Ok(tree) = builder.build(&districts) else {
        return;
    };
    let Ok(proof) = generate_proof(&tree, &districts[0].id) else {
        return;
    };

    c.bench_function("verify_district_proof", |b| {
        b.iter(|| black_box(verify_proof(black_box(&proof), &hasher)))
    });
}

criterion_group!(benches, bench_pair_hash, bench_build, bench_verify);
criterion_main!(benches);

//! Benchmarks for the stupid and culled meshers over a few chunk shapes.

use cgmath::Point3;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxel_world::{
    sandbox_bank, Chunk, CoherentNoiseGenerator, FlatGenerator, Generator, MesherKind,
    NoNeighbors, RandomGenerator, StaircaseGenerator,
};

fn chunks() -> Vec<(&'static str, Chunk)> {
    let bank = sandbox_bank();
    let origin = Point3::new(0, 0, 0);
    let generators: [(&'static str, Box<dyn Generator>); 4] = [
        ("flat", Box::new(FlatGenerator)),
        ("staircase", Box::new(StaircaseGenerator)),
        ("random", Box::new(RandomGenerator::new(7))),
        ("noise", Box::new(CoherentNoiseGenerator::default())),
    ];

    generators
        .into_iter()
        .filter_map(|(name, generator)| {
            generator
                .generate_chunk_at(origin, &bank)
                .ok()
                .map(|chunk| (name, chunk))
        })
        .collect()
}

fn bench_meshers(c: &mut Criterion) {
    let bank = sandbox_bank();
    let chunks = chunks();

    for kind in [MesherKind::Stupid, MesherKind::Culled] {
        let mesher = kind.build();
        let mut group = c.benchmark_group(format!("mesh_{}", mesher.name()));
        for (name, chunk) in &chunks {
            group.bench_with_input(BenchmarkId::from_parameter(name), chunk, |b, chunk| {
                b.iter(|| mesher.generate(black_box(chunk), &NoNeighbors, &bank));
            });
        }
        group.finish();
    }
}

fn bench_generators(c: &mut Criterion) {
    let bank = sandbox_bank();
    c.bench_function("generate_noise_chunk", |b| {
        let generator = CoherentNoiseGenerator::default();
        let mut x = 0;
        b.iter(|| {
            x += 1;
            generator.generate_chunk_at(black_box(Point3::new(x, 0, 0)), &bank)
        });
    });
}

criterion_group!(benches, bench_meshers, bench_generators);
criterion_main!(benches);

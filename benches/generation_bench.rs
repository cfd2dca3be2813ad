use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use evo_arena::core::types::{GenerationId, LaneId};
use evo_arena::decision::RandomDecisions;
use evo_arena::generation::Generation;
use evo_arena::sampler::AttributeSampler;
use evo_arena::stats::StatsAggregator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    // Population sizes can be overridden with EVO_BENCH_POPULATION=100,1000
    let populations: Vec<usize> = std::env::var("EVO_BENCH_POPULATION")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .filter(|v| *v >= 2)
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![100_usize, 1000]);

    let sampler = AttributeSampler::default();
    for &population in &populations {
        group.bench_with_input(BenchmarkId::from_parameter(population), &population, |b, &size| {
            b.iter_batched(
                || {
                    let mut rng = ChaCha8Rng::seed_from_u64(42);
                    let generation =
                        Generation::spawn(LaneId(0), GenerationId(1), &sampler, size, None, 0, &mut rng)
                            .expect("spawn generation");
                    (generation, rng, StatsAggregator::new(1))
                },
                |(mut generation, mut rng, stats)| {
                    let mut decisions = RandomDecisions;
                    generation
                        .run(&stats, &mut decisions, &mut rng)
                        .expect("run generation")
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);

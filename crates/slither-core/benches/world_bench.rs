use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use slither_core::{PlayerInput, SlitherConfig, World};

fn bench_world_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    let steps: usize = std::env::var("SL_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(64);
    for &bots in &[18_usize, 64, 128] {
        group.bench_function(format!("steps{steps}_bots{bots}"), |b| {
            b.iter_batched(
                || {
                    let config = SlitherConfig {
                        bot_count: bots,
                        rng_seed: Some(0xBEEF),
                        history_capacity: 0,
                        ..SlitherConfig::default()
                    };
                    World::new(config).expect("world")
                },
                |mut world| {
                    for _ in 0..steps {
                        let _ = world.step(PlayerInput::default());
                    }
                    world
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_world_steps);
criterion_main!(benches);

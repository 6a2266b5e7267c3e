use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use motley::solver::problem::Problem;
use rand::{rngs::StdRng, SeedableRng};

/// A chain of `rooms` one-hot attribute groups with implications between
/// neighbours: the shape of a typical PCG specification, scaled by length.
fn room_chain_setup(rooms: usize) -> Problem {
    let kinds = ["hall", "vault", "shrine"];
    let mut problem = Problem::new();

    for room in 0..rooms {
        problem
            .attribute(&format!("room{room}"), &[&kinds])
            .unwrap();
        let props: Vec<String> = kinds
            .iter()
            .map(|kind| format!("room{room} {kind}"))
            .collect();
        let props: Vec<&str> = props.iter().map(String::as_str).collect();
        problem.unique(&props).unwrap();
    }

    // No two vaults back to back, and a shrine guards every vault.
    for room in 1..rooms {
        let here = format!("room{room} vault");
        let previous = format!("room{} vault", room - 1);
        let guard = format!("room{} shrine", room - 1);
        problem.inconsistent(&previous, &here).unwrap();
        problem.implies(&[here.as_str()], &guard).unwrap();
    }

    problem
}

fn room_chain_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("room-chain");
    for rooms in [4, 8, 16].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(rooms), rooms, |b, &rooms| {
            let mut problem = room_chain_setup(rooms);
            let mut rng = StdRng::seed_from_u64(0xBE7C);
            b.iter(|| {
                black_box(&mut problem).solve_with_rng(&mut rng).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, room_chain_benchmark);
criterion_main!(benches);

//! Construction and rewriting benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench simplify
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rewrite_rs::expr::Expr;
use rewrite_rs::kind::{Combine, KindSpec};
use rewrite_rs::manager::{Manager, ManagerConfig};
use rewrite_rs::toolbox;
use rewrite_rs::types::KindId;

struct Algebra {
    mgr: Manager,
    times: KindId,
    plus: KindId,
    comm: KindId,
    symbols: Vec<Expr>,
}

fn algebra(num_symbols: usize, config: ManagerConfig) -> Algebra {
    let mut mgr = Manager::with_config(config);
    let op = mgr.register_algebra("Operator");
    let times = mgr
        .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply))
        .unwrap();
    let plus = mgr
        .register_kind(
            KindSpec::nary("OperatorPlus", op)
                .commutative()
                .combine(Combine::Add { scale: times }),
        )
        .unwrap();
    let comm = mgr.register_kind(KindSpec::binary("Commutator", op)).unwrap();
    let symbols = (0..num_symbols)
        .map(|i| mgr.symbol(&format!("A{}", i), op).unwrap())
        .collect();
    Algebra {
        mgr,
        times,
        plus,
        comm,
        symbols,
    }
}

// ============================================================================
// Helper: Random Expression
// ============================================================================

/// Builds a random tree of sums, products and commutators over the symbols.
fn random_expr(alg: &Algebra, rng: &mut ChaCha8Rng, depth: usize) -> Expr {
    if depth == 0 || rng.random_bool(0.2) {
        return alg.symbols[rng.random_range(0..alg.symbols.len())].clone();
    }
    match rng.random_range(0..3) {
        0 => {
            let n = rng.random_range(2..4);
            let operands: Vec<Expr> = (0..n).map(|_| random_expr(alg, rng, depth - 1)).collect();
            alg.mgr.create(alg.plus, operands).unwrap()
        }
        1 => {
            let n = rng.random_range(2..4);
            let mut operands: Vec<Expr> = (0..n).map(|_| random_expr(alg, rng, depth - 1)).collect();
            if rng.random_bool(0.3) {
                operands.insert(0, alg.mgr.scalar(rng.random_range(-3i64..=3)));
            }
            alg.mgr.create(alg.times, operands).unwrap()
        }
        _ => {
            let left = random_expr(alg, rng, depth - 1);
            let right = random_expr(alg, rng, depth - 1);
            alg.mgr.binary(alg.comm, left, right).unwrap()
        }
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct/random");

    for interning in [true, false] {
        group.bench_with_input(
            BenchmarkId::new("depth=5", if interning { "interned" } else { "plain" }),
            &interning,
            |b, &interning| {
                b.iter(|| {
                    let alg = algebra(8, ManagerConfig { interning });
                    let mut rng = ChaCha8Rng::seed_from_u64(42);
                    (0..20).map(|_| random_expr(&alg, &mut rng, 5).size()).sum::<usize>()
                });
            },
        );
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify/evaluate_commutators");
    group.sample_size(20);

    for depth in [3, 4, 5] {
        let alg = algebra(6, ManagerConfig::default());
        let rules = toolbox::evaluate_commutator_rules(&alg.mgr, alg.comm, alg.times, alg.plus).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let exprs: Vec<Expr> = (0..10).map(|_| random_expr(&alg, &mut rng, depth)).collect();

        group.bench_with_input(BenchmarkId::new("depth", depth), &exprs, |b, exprs| {
            b.iter(|| {
                exprs
                    .iter()
                    .map(|e| alg.mgr.simplify(e, &rules).unwrap().size())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

fn bench_leibniz(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify/leibniz");

    for n in [2, 4, 8] {
        let alg = algebra(n + 1, ManagerConfig::default());
        let rules = toolbox::leibniz_rules(&alg.mgr, alg.comm, alg.times, alg.plus).unwrap();
        let product = alg.mgr.create(alg.times, alg.symbols[..n].to_vec()).unwrap();
        let expr = alg.mgr.binary(alg.comm, product, alg.symbols[n].clone()).unwrap();

        group.bench_with_input(BenchmarkId::new("factors", n), &expr, |b, expr| {
            b.iter(|| alg.mgr.simplify(expr, &rules).unwrap());
        });
    }

    group.finish();
}

fn bench_distribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify/distribute");
    group.sample_size(10);

    for n in [2, 3, 4] {
        let alg = algebra(3, ManagerConfig::default());
        let sum = alg.mgr.create(alg.plus, alg.symbols.clone()).unwrap();
        let power = alg.mgr.create(alg.times, vec![sum; n]).unwrap();

        group.bench_with_input(BenchmarkId::new("power", n), &power, |b, power| {
            b.iter(|| toolbox::expand(&alg.mgr, power, alg.times, alg.plus).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction, bench_evaluate, bench_leibniz, bench_distribute);

criterion_main!(benches);

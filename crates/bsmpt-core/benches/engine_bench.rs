// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Core Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the per-point hot paths: tensor
//! contraction, eigendecomposition, Coleman-Weinberg derivatives and the
//! O(N⁶) triple-coupling rotation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bsmpt_core::couplings::PhysicalCouplings;
use bsmpt_core::loops::LoopFunctions;
use bsmpt_core::one_loop::{weinberg_second_derivative, weinberg_third_derivative};
use bsmpt_core::spectral::symmetric_eigen;
use bsmpt_core::triple::rotate_triple;
use bsmpt_core::ModelTensors;
use bsmpt_types::EngineConfig;

const N: usize = 8;

/// Dense quartic with a positive mass term, deterministic entries.
fn dense_tensors() -> ModelTensors {
    let mut t = ModelTensors::new(N, 4, 4, 2);
    for i in 0..N {
        t.higgs.set_l2(i, i, 100.0 + 10.0 * i as f64);
        for j in i..N {
            for k in j..N {
                for l in k..N {
                    let v = ((i + 2 * j + 3 * k + 5 * l) % 7) as f64 * 0.05;
                    t.higgs.set_l4([i, j, k, l], v);
                }
            }
        }
    }
    t
}

fn point() -> Vec<f64> {
    (0..N).map(|i| 10.0 + i as f64).collect()
}

// ── Tensor contraction ──────────────────────────────────────────────

fn bench_tensor_hessian(c: &mut Criterion) {
    let t = dense_tensors();
    let x = point();
    c.bench_function("tensor_hessian_n8", |b| {
        b.iter(|| t.higgs.hessian(black_box(&x)))
    });
}

// ── Eigendecomposition ──────────────────────────────────────────────

fn bench_symmetric_eigen(c: &mut Criterion) {
    let t = dense_tensors();
    let h = t.higgs.hessian(&point()).unwrap_or_default();
    c.bench_function("symmetric_eigen_n8", |b| {
        b.iter(|| symmetric_eigen(black_box(&h), N))
    });
}

// ── Coleman-Weinberg derivatives ────────────────────────────────────

fn bench_weinberg_derivatives(c: &mut Criterion) {
    let t = dense_tensors();
    let config = EngineConfig::default();
    let loops = LoopFunctions::new(246.22);
    let Ok(couplings) = PhysicalCouplings::compute(&t, &point(), &config) else {
        return;
    };
    c.bench_function("weinberg_second_n8", |b| {
        b.iter(|| weinberg_second_derivative(black_box(&couplings), &config, &loops))
    });
    c.bench_function("weinberg_third_n8", |b| {
        b.iter(|| weinberg_third_derivative(black_box(&couplings), &config, &loops))
    });
}

// ── Triple-coupling rotation ────────────────────────────────────────

fn bench_rotate_triple(c: &mut Criterion) {
    let t = dense_tensors();
    let x = point();
    let third = t.higgs.third(&x).unwrap_or_default();
    let rotation = symmetric_eigen(&t.higgs.hessian(&x).unwrap_or_default(), N)
        .map(|e| e.rotation_rows())
        .unwrap_or_default();
    c.bench_function("rotate_triple_n8", |b| {
        b.iter(|| rotate_triple(black_box(&rotation), black_box(&third), N))
    });
}

criterion_group!(
    benches,
    bench_tensor_hessian,
    bench_symmetric_eigen,
    bench_weinberg_derivatives,
    bench_rotate_triple,
);
criterion_main!(benches);

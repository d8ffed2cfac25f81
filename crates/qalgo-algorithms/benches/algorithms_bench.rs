//! Benchmarks for algorithm circuit construction and simulation
//!
//! Run with: cargo bench -p qalgo-algorithms

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qalgo_adapter_sim::SimulatorBackend;
use qalgo_algorithms::{create_qft_circuit, phase_unitary, qpe_circuit, shor::order_finding_circuit};
use qalgo_hal::Backend;
use qalgo_ir::{Circuit, QubitId};

fn bench_qft(c: &mut Criterion) {
    let mut group = c.benchmark_group("qft");
    let backend = SimulatorBackend::new().with_seed(1);

    for n in &[4u32, 8, 12] {
        group.bench_with_input(BenchmarkId::new("build", n), n, |b, &n| {
            b.iter(|| black_box(create_qft_circuit(n)));
        });
        let circuit = create_qft_circuit(*n);
        group.bench_with_input(BenchmarkId::new("statevector", n), &circuit, |b, circuit| {
            b.iter(|| black_box(backend.statevector(circuit).unwrap()));
        });
    }

    group.finish();
}

fn bench_qpe(c: &mut Criterion) {
    let mut group = c.benchmark_group("qpe");
    let backend = SimulatorBackend::new().with_seed(2);
    let mut eigenstate = Circuit::with_size("one", 1, 0);
    eigenstate.x(QubitId(0)).unwrap();

    for n in &[4u32, 6, 8] {
        let circuit = qpe_circuit(&phase_unitary(0.3), &eigenstate, *n).unwrap();
        group.bench_with_input(BenchmarkId::new("run_1024", n), &circuit, |b, circuit| {
            b.iter(|| black_box(backend.run(circuit, 1024).unwrap()));
        });
    }

    group.finish();
}

fn bench_order_finding(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_finding");
    group.sample_size(10);

    group.bench_function("build_2_mod_15", |b| {
        b.iter(|| black_box(order_finding_circuit(2, 15).unwrap()));
    });

    let backend = SimulatorBackend::new().with_seed(3);
    let circuit = order_finding_circuit(2, 15).unwrap();
    group.bench_function("run_2_mod_15", |b| {
        b.iter(|| black_box(backend.run(&circuit, 256).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_qft, bench_qpe, bench_order_finding);
criterion_main!(benches);

//! Benchmarks for the pulse, gate and CV listeners.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_transport::{
    engine::{CvFollower, GateDetector, Node, PulseDetector},
    EngineConfig, Processor, RenderCtx,
};

use super::pulse_train;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("processors/detectors");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let signal = pulse_train(size, 48);
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, size);

        let (mut pulse, mut pulse_handle) = Node::new(PulseDetector::from_config(&config), 1024);
        group.bench_with_input(BenchmarkId::new("pulse", size), &size, |b, _| {
            b.iter(|| {
                pulse.render_quantum(
                    black_box(&ctx),
                    &[black_box(signal.as_slice())],
                    &mut [],
                );
                pulse_handle.drain().for_each(drop);
            })
        });

        let (mut gate, mut gate_handle) = Node::new(GateDetector::from_config(&config), 1024);
        group.bench_with_input(BenchmarkId::new("gate", size), &size, |b, _| {
            b.iter(|| {
                gate.render_quantum(
                    black_box(&ctx),
                    &[black_box(signal.as_slice())],
                    &mut [],
                );
                gate_handle.drain().for_each(drop);
            })
        });

        let (mut cv, mut cv_handle) = Node::new(CvFollower::from_config(&config), 1024);
        group.bench_with_input(BenchmarkId::new("cv", size), &size, |b, _| {
            b.iter(|| {
                cv.render_quantum(
                    black_box(&ctx),
                    &[black_box(signal.as_slice())],
                    &mut [],
                );
                cv_handle.drain().for_each(drop);
            })
        });
    }

    group.finish();
}

//! Benchmarks for the step sequencer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_transport::{
    engine::{Node, StepSequencer},
    io::SequencerCommand,
    sequencing::{PatternUpdate, Step},
    EngineConfig, Processor, RenderCtx,
};

use super::pulse_train;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn busy_pattern() -> PatternUpdate {
    let steps = (0..16)
        .map(|i| {
            Step::on(i as f32 * 0.1)
                .with_length(60.0)
                .with_slide(i % 3 == 0)
                .with_accent(i % 4 == 0)
        })
        .collect();
    PatternUpdate::new(steps).division(16).swing(25.0)
}

pub fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("processors/sequencer");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let mut cv = vec![0.0f32; size];
        let mut gate = vec![0.0f32; size];
        let mut accent = vec![0.0f32; size];
        // One pulse per 24 samples keeps several steps inside every block
        let pulses = pulse_train(size, 24);

        let (mut node, mut handle) = Node::new(StepSequencer::from_config(&config), 256);
        handle.send(SequencerCommand::state(busy_pattern())).ok();

        let mut ctx = RenderCtx::new(SAMPLE_RATE, 0, size);
        group.bench_with_input(BenchmarkId::new("swing_slide", size), &size, |b, _| {
            b.iter(|| {
                node.render_quantum(
                    black_box(&ctx),
                    &[black_box(pulses.as_slice())],
                    &mut [cv.as_mut_slice(), gate.as_mut_slice(), accent.as_mut_slice()],
                );
                handle.drain().for_each(drop);
                ctx = ctx.next();
            })
        });
    }

    group.finish();
}

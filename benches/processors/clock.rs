//! Benchmarks for the master clock.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_transport::{
    engine::{MasterClock, Node},
    io::ClockCommand,
    EngineConfig, Processor, RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("processors/clock");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let mut pulse = vec![0.0f32; size];
        let mut start = vec![0.0f32; size];
        let mut stop = vec![0.0f32; size];

        // Running with a dense tempo map to integrate across
        let (mut node, mut handle) = Node::new(MasterClock::from_config(&config), 256);
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, size);
        handle
            .send(ClockCommand::Start { time: 0.0, beat: 0.0 })
            .ok();
        for i in 0..60 {
            handle
                .send(ClockCommand::ScheduleTempo {
                    time: i as f64 * 0.5,
                    bpm: 90.0 + i as f64,
                })
                .ok();
        }
        node.render_quantum(
            &ctx,
            &[],
            &mut [pulse.as_mut_slice(), start.as_mut_slice(), stop.as_mut_slice()],
        );

        let mut ctx = ctx;
        group.bench_with_input(BenchmarkId::new("running", size), &size, |b, _| {
            b.iter(|| {
                ctx = ctx.next();
                node.render_quantum(
                    black_box(&ctx),
                    &[],
                    &mut [pulse.as_mut_slice(), start.as_mut_slice(), stop.as_mut_slice()],
                );
                handle.drain().for_each(drop);
            })
        });
    }

    group.finish();
}

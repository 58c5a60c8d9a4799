//! Benchmarks for the event scheduler.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_transport::{
    engine::{EventScheduler, Node},
    io::SchedulerCommand,
    sequencing::{EventList, TimedEvent},
    EngineConfig, Processor, RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("processors/scheduler");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    // An event every millisecond for a long time
    let list: EventList<u32> = (0..1_000_000)
        .map(|i| TimedEvent::new(i as f64 * 0.001, i))
        .collect();

    for &size in BLOCK_SIZES {
        let (mut node, mut handle) =
            Node::new(EventScheduler::<u32>::from_config(&config), 1024);
        handle
            .send(SchedulerCommand::Events { list: list.clone() })
            .ok();
        handle
            .send(SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            })
            .ok();

        let mut ctx = RenderCtx::new(SAMPLE_RATE, 0, size);
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |b, _| {
            b.iter(|| {
                node.render_quantum(black_box(&ctx), &[], &mut []);
                handle.drain().for_each(drop);
                ctx = ctx.next();
            })
        });
    }

    group.finish();
}

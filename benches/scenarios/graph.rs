//! Benchmark for a clock driving a sequencer and two detectors.

use criterion::{BenchmarkId, Criterion};
use pulse_transport::{
    engine::{GateDetector, MasterClock, PulseDetector, StepSequencer},
    io::{ClockCommand, SequencerCommand},
    runtime::{ProcessorRegistry, RenderGraph},
    sequencing::{PatternUpdate, Step},
    EngineConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/transport");
    let registry =
        ProcessorRegistry::with_all(EngineConfig::default().with_sample_rate(SAMPLE_RATE));

    for &size in BLOCK_SIZES {
        let (Ok((clock, mut transport)), Ok((seq, mut steps))) = (
            registry.instantiate::<MasterClock>(),
            registry.instantiate::<StepSequencer>(),
        ) else {
            panic!("registry has every processor");
        };
        let (Ok((pulses, mut pulse_reports)), Ok((gates, mut gate_reports))) = (
            registry.instantiate::<PulseDetector>(),
            registry.instantiate::<GateDetector>(),
        ) else {
            panic!("registry has every processor");
        };

        let mut graph = RenderGraph::new(SAMPLE_RATE, size);
        let clock = graph.add(clock);
        let seq = graph.add(seq);
        let pulses = graph.add(pulses);
        let gates = graph.add(gates);
        graph.connect(clock, 0, seq, 0).ok();
        graph.connect(clock, 0, pulses, 0).ok();
        graph.connect(seq, 1, gates, 0).ok();

        let pattern = PatternUpdate::new(vec![Step::on(1.0), Step::rest(), Step::on(2.0)]);
        steps.send(SequencerCommand::state(pattern)).ok();
        transport
            .send(ClockCommand::Start { time: 0.0, beat: 0.0 })
            .ok();

        group.bench_with_input(BenchmarkId::new("clock_seq_detectors", size), &size, |b, &size| {
            b.iter(|| {
                graph.render_quantum(size);
                transport.drain().for_each(drop);
                steps.drain().for_each(drop);
                pulse_reports.drain().for_each(drop);
                gate_reports.drain().for_each(drop);
            })
        });
    }

    group.finish();
}

//! Benchmarks for single processors.

mod clock;
mod detector;
mod scheduler;
mod sequencer;

pub use clock::bench_clock;
pub use detector::bench_detectors;
pub use scheduler::bench_scheduler;
pub use sequencer::bench_sequencer;

/// A pulse train with one 10 sample pulse every `period` samples.
pub fn pulse_train(len: usize, period: usize) -> Vec<f32> {
    (0..len)
        .map(|i| if i % period < 10 { 1.0 } else { 0.0 })
        .collect()
}

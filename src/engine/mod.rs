//! Render-thread processors.
//!
//! Each processor runs once per quantum on the real-time thread. It owns all
//! of its runtime state; the control thread reaches it only through commands
//! and reports carried by its [`Node`].

/// Tempo-mapped transport and pulse train.
pub mod clock;
/// Pulse, gate and CV listeners on an audio-rate input.
pub mod detector;
/// Render context, node wrapper and the object-safe node trait.
pub mod node;
/// Sample-accurate dispatch of a sorted event list.
pub mod scheduler;
/// Pulse-driven CV/gate/accent step sequencer.
pub mod step_sequencer;

pub use clock::MasterClock;
pub use detector::{CvFollower, GateDetector, PulseDetector};
pub use node::{AudioNode, Node, RenderCtx};
pub use scheduler::EventScheduler;
pub use step_sequencer::StepSequencer;

use std::fmt;

use crate::{config::EngineConfig, io::ReportSink};

/// The processor types a render graph can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ProcessorKind {
    MasterClock,
    StepSequencer,
    EventScheduler,
    PulseDetector,
    GateDetector,
    CvFollower,
}

impl ProcessorKind {
    pub const ALL: [ProcessorKind; 6] = [
        ProcessorKind::MasterClock,
        ProcessorKind::StepSequencer,
        ProcessorKind::EventScheduler,
        ProcessorKind::PulseDetector,
        ProcessorKind::GateDetector,
        ProcessorKind::CvFollower,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProcessorKind::MasterClock => "master-clock",
            ProcessorKind::StepSequencer => "step-sequencer",
            ProcessorKind::EventScheduler => "event-scheduler",
            ProcessorKind::PulseDetector => "pulse-detector",
            ProcessorKind::GateDetector => "gate-detector",
            ProcessorKind::CvFollower => "cv-follower",
        }
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit of real-time work with typed commands and reports.
///
/// Implementations must not block, lock or allocate inside
/// `handle_command` and `process`.
pub trait Processor: Send + 'static {
    type Command: Send + 'static;
    type Report: Send + 'static;

    const KIND: ProcessorKind;
    /// Audio-rate inputs, in port order
    const INPUTS: usize;
    /// Audio-rate outputs, in port order
    const OUTPUTS: usize;

    /// Build a processor for an audio context.
    fn from_config(config: &EngineConfig) -> Self
    where
        Self: Sized;

    /// Apply one command at the start of the quantum described by `ctx`.
    fn handle_command(&mut self, command: Self::Command, ctx: &RenderCtx);

    /// Render one quantum.
    ///
    /// Missing or short inputs read as silence; outputs that are missing are
    /// skipped, but state still advances by `ctx.frames` samples.
    fn process<S: ReportSink<Self::Report>>(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        reports: &mut S,
    );
}

/// Write `value` to sample `i` of output `port`, if both exist.
#[inline]
pub(crate) fn write_output(outputs: &mut [&mut [f32]], port: usize, i: usize, value: f32) {
    if let Some(sample) = outputs.get_mut(port).and_then(|buf| buf.get_mut(i)) {
        *sample = value;
    }
}

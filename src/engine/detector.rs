//! Passive listeners that turn one audio-rate input into control messages.
//!
//! None of them take commands or write audio. Reported times are the
//! absolute audio-thread time of the sample that triggered the report.

use super::{Processor, ProcessorKind, RenderCtx};
use crate::{
    config::EngineConfig,
    dsp::{finite_or_zero, input_at, Cooldown, RisingEdge, SchmittTrigger, Transition},
    io::{DetectorReport, ReportSink},
};

/// Reports one `pulse` per rising threshold crossing, ignoring further
/// crossings for a cooldown window so ringing edges count once.
pub struct PulseDetector {
    edge: RisingEdge,
    cooldown: Cooldown,
}

impl PulseDetector {
    pub fn new(threshold: f32, cooldown_samples: u32) -> Self {
        Self {
            edge: RisingEdge::new(threshold),
            cooldown: Cooldown::new(cooldown_samples),
        }
    }
}

impl Processor for PulseDetector {
    type Command = ();
    type Report = DetectorReport;

    const KIND: ProcessorKind = ProcessorKind::PulseDetector;
    const INPUTS: usize = 1;
    const OUTPUTS: usize = 0;

    fn from_config(config: &EngineConfig) -> Self {
        let detector = &config.detector;
        Self::new(detector.pulse_threshold, detector.pulse_cooldown_samples)
    }

    fn handle_command(&mut self, _command: (), _ctx: &RenderCtx) {}

    fn process<S: ReportSink<DetectorReport>>(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        _outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        for i in 0..ctx.frames {
            self.cooldown.tick();
            let rose = self.edge.process(input_at(inputs.first(), i));
            if rose && self.cooldown.is_ready() {
                self.cooldown.arm();
                reports.emit(DetectorReport::Pulse {
                    time: ctx.time_at(i),
                });
            }
        }
    }
}

/// Reports `gate-on`/`gate-off` transitions with separate rise and fall
/// thresholds.
pub struct GateDetector {
    trigger: SchmittTrigger,
}

impl GateDetector {
    pub fn new(rise: f32, fall: f32) -> Self {
        Self {
            trigger: SchmittTrigger::new(rise, fall),
        }
    }

    pub fn is_high(&self) -> bool {
        self.trigger.is_high()
    }
}

impl Processor for GateDetector {
    type Command = ();
    type Report = DetectorReport;

    const KIND: ProcessorKind = ProcessorKind::GateDetector;
    const INPUTS: usize = 1;
    const OUTPUTS: usize = 0;

    fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.detector.gate_rise, config.detector.gate_fall)
    }

    fn handle_command(&mut self, _command: (), _ctx: &RenderCtx) {}

    fn process<S: ReportSink<DetectorReport>>(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        _outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        for i in 0..ctx.frames {
            let time = ctx.time_at(i);
            match self.trigger.process(input_at(inputs.first(), i)) {
                Some(Transition::Rise) => reports.emit(DetectorReport::GateOn { time }),
                Some(Transition::Fall) => reports.emit(DetectorReport::GateOff { time }),
                None => {}
            }
        }
    }
}

/// Averages the input over fixed blocks and reports each block's mean.
///
/// Blocks run across quantum boundaries.
pub struct CvFollower {
    block: u32,
    sum: f64,
    count: u32,
}

impl CvFollower {
    pub fn new(block: u32) -> Self {
        Self {
            block: block.max(1),
            sum: 0.0,
            count: 0,
        }
    }
}

impl Processor for CvFollower {
    type Command = ();
    type Report = DetectorReport;

    const KIND: ProcessorKind = ProcessorKind::CvFollower;
    const INPUTS: usize = 1;
    const OUTPUTS: usize = 0;

    fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.detector.cv_block_samples)
    }

    fn handle_command(&mut self, _command: (), _ctx: &RenderCtx) {}

    fn process<S: ReportSink<DetectorReport>>(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        _outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        for i in 0..ctx.frames {
            self.sum += finite_or_zero(input_at(inputs.first(), i)) as f64;
            self.count += 1;
            if self.count >= self.block {
                reports.emit(DetectorReport::Cv {
                    value: (self.sum / self.block as f64) as f32,
                });
                self.sum = 0.0;
                self.count = 0;
            }
        }
    }
}

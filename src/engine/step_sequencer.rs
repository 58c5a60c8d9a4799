//! Pulse-driven step sequencer.
//!
//! Inputs: `[pulse, reset]`. Outputs: `[cv, gate, accent]`.
//!
//! Incoming pulses are counted against the pattern's pulses-per-step. Each
//! completed step becomes a pending step event stamped with the absolute
//! sample it is due at (swing shifts that sample, the unswung sample is kept
//! for interval measurement). Events are resolved only when their sample is
//! rendered, so step reports and output changes land together.
//!
//! Per sample, in order:
//!   1. reset edge, then pulse edge (may queue step events)
//!   2. apply due step events
//!   3. gate and accent fall once their off sample is reached
//!   4. advance the CV glide
//!   5. write cv, gate, accent

use arrayvec::ArrayVec;

use super::{write_output, Processor, ProcessorKind, RenderCtx};
use crate::{
    config::EngineConfig,
    dsp::{input_at, LinearRamp, RisingEdge},
    io::{ReportSink, SequencerCommand, SequencerReport},
    sequencing::{Pattern, MAX_STEPS},
    HIGH_THRESHOLD,
};

const MAX_PENDING: usize = 64;
const PULSE_EPSILON: f64 = 1e-9;

/// A step that has been counted but not yet applied.
#[derive(Debug, Clone, Copy)]
struct StepEvent {
    /// Absolute sample the step lands on, swing included
    due: u64,
    /// Same step without swing
    nominal: u64,
}

pub struct StepSequencer {
    sample_rate: f32,
    pattern: Pattern,
    pulse_in: RisingEdge,
    reset_in: RisingEdge,

    current_step: usize,
    /// Next step event lands on `current_step` instead of advancing past it
    armed: bool,
    announce_reset: bool,
    pulse_acc: f64,
    last_pulse_sample: Option<u64>,
    last_pulse_interval: Option<u64>,
    trigger_count: u64,
    last_nominal: Option<u64>,
    last_step_interval: Option<u64>,
    pending: ArrayVec<StepEvent, MAX_PENDING>,

    cv: LinearRamp,
    gate: bool,
    gate_off: u64,
    gate_blank: bool,
    accent: bool,
    accent_off: u64,
    accent_blank: bool,
}

impl StepSequencer {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Index of the step most recently applied.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn cv(&self) -> f32 {
        self.cv.value()
    }

    pub fn gate_is_high(&self) -> bool {
        self.gate
    }

    fn primed_accumulator(&self) -> f64 {
        (self.pattern.pulses_per_step() - 1.0).max(0.0)
    }

    fn base_step_samples(&self) -> u64 {
        let samples = (self.pattern.base_gate_seconds() * self.sample_rate).round() as u64;
        samples.max(1)
    }

    /// Return to step 0 with all timing cleared, so the next completed pulse
    /// lands on step 0.
    fn reset(&mut self) {
        self.current_step = 0;
        self.armed = true;
        self.pulse_acc = self.primed_accumulator();
        self.last_pulse_sample = None;
        self.last_pulse_interval = None;
        self.trigger_count = 0;
        self.last_nominal = None;
        self.last_step_interval = None;
        self.pending.clear();

        self.cv.jump(self.pattern.step(0).value);
        self.gate = false;
        self.gate_blank = false;
        self.accent = false;
        self.accent_blank = false;
    }

    fn on_pulse(&mut self, n: u64) {
        if let Some(last) = self.last_pulse_sample {
            if n > last {
                self.last_pulse_interval = Some(n - last);
            }
        }
        self.last_pulse_sample = Some(n);

        let pps = self.pattern.pulses_per_step();
        let step_span = self.last_pulse_interval.map(|d| d as f64 * pps);
        let ratchet_span = step_span
            .unwrap_or(self.base_step_samples() as f64)
            .round() as u64;
        let swing = self.pattern.swing() as f64;

        self.pulse_acc += 1.0;
        let mut ratchet = 0u64;
        while self.pulse_acc + PULSE_EPSILON >= pps {
            if ratchet as usize >= MAX_STEPS {
                self.pulse_acc = 0.0;
                break;
            }
            self.pulse_acc -= pps;

            let nominal = n + ratchet * ratchet_span;
            let odd = self.trigger_count % 2 == 1;
            let delayed = if swing > 0.0 { odd } else { !odd };
            let offset = match step_span {
                Some(span) if swing != 0.0 && delayed => {
                    (swing.abs() / 100.0 * span).round() as u64
                }
                _ => 0,
            };

            let event = StepEvent {
                due: nominal + offset,
                nominal,
            };
            let at = self.pending.partition_point(|e| e.due <= event.due);
            // A full queue drops the newest step. Swing parity only counts
            // steps that were queued.
            if self.pending.try_insert(at, event).is_ok() {
                self.trigger_count += 1;
            }
            ratchet += 1;
        }
        self.pulse_acc = self.pulse_acc.max(0.0);
    }

    fn apply_step<S: ReportSink<SequencerReport>>(
        &mut self,
        event: StepEvent,
        n: u64,
        reports: &mut S,
    ) {
        let len = self.pattern.len().max(1);
        let idx = if self.armed {
            self.armed = false;
            self.current_step % len
        } else {
            (self.current_step + 1) % len
        };

        let step = self.pattern.step(idx);
        let prev = self.pattern.step(idx + len - 1);
        let next = self.pattern.step(idx + 1);

        let interval = self
            .last_nominal
            .filter(|&last| event.nominal > last)
            .map(|last| event.nominal - last);
        if interval.is_some() {
            self.last_step_interval = interval;
        }
        self.last_nominal = Some(event.nominal);
        let step_samples = self.last_step_interval.unwrap_or_else(|| self.base_step_samples());

        let slide_from_prev = prev.active && step.active && step.slide && interval.is_some();
        let slide_into_next = step.active && next.active && next.slide;
        let gate_high = self.gate && n < self.gate_off;
        let accent_high = self.accent && n < self.accent_off;
        let legato = slide_from_prev && gate_high;

        if step.active {
            if slide_from_prev {
                let glide = (self.pattern.slide_time() * self.sample_rate).round() as u32;
                self.cv.glide_to(step.value, glide);
            } else {
                self.cv.jump(step.value);
            }

            let mut length = scaled(step_samples, step.length_pct);
            if slide_into_next {
                length = step_samples + scaled(step_samples, next.length_pct);
            }

            if gate_high && !legato {
                self.gate_blank = true;
            }
            self.gate = true;
            self.gate_off = n + length;

            if step.accent {
                if accent_high && !legato {
                    self.accent_blank = true;
                }
                self.accent = true;
                self.accent_off = n + length;
            } else {
                self.accent = false;
            }
        } else {
            // CV holds on rests
            self.gate = false;
            self.accent = false;
        }

        self.current_step = idx;
        reports.emit(SequencerReport::Step { current_step: idx });
    }
}

/// `round(samples * pct / 100)`, at least one sample.
fn scaled(samples: u64, pct: f32) -> u64 {
    ((samples as f64 * pct as f64 / 100.0).round() as u64).max(1)
}

impl Processor for StepSequencer {
    type Command = SequencerCommand;
    type Report = SequencerReport;

    const KIND: ProcessorKind = ProcessorKind::StepSequencer;
    const INPUTS: usize = 2;
    const OUTPUTS: usize = 3;

    fn from_config(config: &EngineConfig) -> Self {
        let pattern = Pattern::silent(16, &config.sequencer);
        let mut seq = Self {
            sample_rate: config.effective_sample_rate(),
            pattern,
            pulse_in: RisingEdge::new(HIGH_THRESHOLD),
            reset_in: RisingEdge::new(HIGH_THRESHOLD),
            current_step: 0,
            armed: true,
            announce_reset: false,
            pulse_acc: 0.0,
            last_pulse_sample: None,
            last_pulse_interval: None,
            trigger_count: 0,
            last_nominal: None,
            last_step_interval: None,
            pending: ArrayVec::new(),
            cv: LinearRamp::new(0.0),
            gate: false,
            gate_off: 0,
            gate_blank: false,
            accent: false,
            accent_off: 0,
            accent_blank: false,
        };
        seq.reset();
        seq
    }

    fn handle_command(&mut self, command: SequencerCommand, _ctx: &RenderCtx) {
        match command {
            SequencerCommand::State(pattern) => {
                self.pattern = pattern;
                self.current_step %= self.pattern.len().max(1);
                if self.armed && self.pending.is_empty() {
                    self.pulse_acc = self.primed_accumulator();
                } else {
                    self.pulse_acc = self.pulse_acc.min(self.primed_accumulator());
                }
            }
            SequencerCommand::Reset => {
                self.reset();
                self.announce_reset = true;
            }
        }
    }

    fn process<S: ReportSink<SequencerReport>>(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        if self.announce_reset {
            self.announce_reset = false;
            reports.emit(SequencerReport::Step { current_step: 0 });
        }

        for i in 0..ctx.frames {
            let n = ctx.current_frame + i as u64;

            if self.reset_in.process(input_at(inputs.get(1), i)) {
                self.reset();
                reports.emit(SequencerReport::Step { current_step: 0 });
            }
            if self.pulse_in.process(input_at(inputs.first(), i)) {
                self.on_pulse(n);
            }

            while let Some(event) = self.pending.first().copied().filter(|e| e.due <= n) {
                self.pending.remove(0);
                self.apply_step(event, n, reports);
            }

            if self.gate && n >= self.gate_off {
                self.gate = false;
            }
            if self.accent && n >= self.accent_off {
                self.accent = false;
            }

            let cv = self.cv.next_sample();
            let gate = if self.gate && !self.gate_blank { 1.0 } else { 0.0 };
            let accent = if self.accent && !self.accent_blank { 1.0 } else { 0.0 };
            self.gate_blank = false;
            self.accent_blank = false;

            write_output(outputs, 0, i, cv);
            write_output(outputs, 1, i, gate);
            write_output(outputs, 2, i, accent);
        }
    }
}

//! Master clock: tempo-mapped transport position plus audio-rate pulses.
//!
//! Outputs, in port order:
//!   0. pulse train, `CLOCK_PPQ` pulses per quarter note while running
//!   1. start pulse, one fixed-width pulse per `start`
//!   2. stop pulse, one fixed-width pulse per `stop`
//!
//! Position is never accumulated sample by sample. It is integrated from the
//! tempo map on demand (`beat_at`), so reports and seeks always agree.

use super::{write_output, Processor, ProcessorKind, RenderCtx};
use crate::{
    config::EngineConfig,
    dsp::{OneShot, PulseTrain},
    io::{ClockCommand, ClockReport, ReportSink},
    sequencing::TempoMap,
    CLOCK_PPQ,
};

const DEFAULT_TICK_INTERVAL: f64 = 0.025;

pub struct MasterClock {
    sample_rate: f32,
    tempo: TempoMap,
    running: bool,
    /// Absolute time that `start_beat` is anchored to
    start_time: f64,
    start_beat: f64,
    paused_beat: f64,
    train: PulseTrain,
    pulse_width: u64,
    start_pulse: OneShot,
    stop_pulse: OneShot,
    tick_interval: f64,
    next_tick: f64,
}

impl MasterClock {
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tempo in effect at `time`.
    pub fn bpm_at(&self, time: f64) -> f64 {
        self.tempo.bpm_at(time)
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo
    }

    /// Transport position in beats at absolute time `time`.
    ///
    /// While running this integrates the tempo map from the start anchor and
    /// never goes below the anchor beat; while stopped it is the frozen beat.
    pub fn beat_at(&self, time: f64) -> f64 {
        if self.running {
            self.start_beat + self.tempo.beats_between(self.start_time, time)
        } else {
            self.paused_beat
        }
    }

    /// Samples between pulse onsets at `bpm`, never less than one.
    pub fn samples_per_pulse(&self, bpm: f64) -> u64 {
        let samples = self.sample_rate as f64 * 60.0 / (bpm * CLOCK_PPQ as f64);
        samples.round().max(1.0) as u64
    }

    // Tempo already rendered is history; a running transport only takes
    // changes from the current quantum on.
    fn not_before_now(&self, time: f64, now: f64) -> f64 {
        if self.running {
            time.max(now)
        } else {
            time
        }
    }

    // Drop history that can no longer affect the position before growing
    // the map; `TempoMap` itself evicts the last entry if that is not enough.
    fn make_room(&mut self, now: f64) {
        if self.tempo.is_full() {
            let anchor = if self.running { self.start_time } else { now };
            self.tempo.prune_before(anchor);
        }
    }
}

impl Processor for MasterClock {
    type Command = ClockCommand;
    type Report = ClockReport;

    const KIND: ProcessorKind = ProcessorKind::MasterClock;
    const INPUTS: usize = 0;
    const OUTPUTS: usize = 3;

    fn from_config(config: &EngineConfig) -> Self {
        let sample_rate = config.effective_sample_rate();
        let clock = &config.clock;

        let width_seconds = if clock.pulse_width_seconds.is_finite() {
            clock.pulse_width_seconds.max(0.0)
        } else {
            0.0
        };
        let pulse_width = ((width_seconds * sample_rate as f64).round() as u64).max(1);
        let tick_interval = if clock.tick_interval_seconds.is_finite()
            && clock.tick_interval_seconds > 0.0
        {
            clock.tick_interval_seconds
        } else {
            DEFAULT_TICK_INTERVAL
        };
        let start_beat = if clock.start_beat.is_finite() {
            clock.start_beat
        } else {
            0.0
        };

        Self {
            sample_rate,
            tempo: TempoMap::new(clock.bpm),
            running: false,
            start_time: 0.0,
            start_beat,
            paused_beat: start_beat,
            train: PulseTrain::new(),
            pulse_width,
            start_pulse: OneShot::new(pulse_width as u32),
            stop_pulse: OneShot::new(pulse_width as u32),
            tick_interval,
            next_tick: 0.0,
        }
    }

    fn handle_command(&mut self, command: ClockCommand, ctx: &RenderCtx) {
        let now = ctx.current_time();
        match command {
            ClockCommand::Init {
                bpm,
                start_beat,
                tick_interval_sec,
            } => {
                if !bpm.is_finite() || !start_beat.is_finite() {
                    return;
                }
                self.tempo.reset(now, bpm);
                self.train.reset();
                self.start_beat = start_beat;
                self.paused_beat = start_beat;
                if self.running {
                    self.start_time = now;
                }
                if tick_interval_sec.is_finite() && tick_interval_sec > 0.0 {
                    self.tick_interval = tick_interval_sec;
                }
                self.next_tick = now;
            }
            ClockCommand::Start { time, beat } => {
                if !time.is_finite() || !beat.is_finite() {
                    return;
                }
                self.running = true;
                self.start_time = time;
                self.start_beat = beat;
                self.tempo.rebase(time);
                self.train.reset();
                self.start_pulse.fire();
            }
            ClockCommand::Stop { time } => {
                if !time.is_finite() {
                    return;
                }
                self.paused_beat = self.beat_at(time);
                self.running = false;
                self.train.reset();
                self.stop_pulse.fire();
            }
            ClockCommand::Seek { time, beat } => {
                if !time.is_finite() || !beat.is_finite() {
                    return;
                }
                if self.running {
                    self.start_time = time;
                    self.start_beat = beat;
                } else {
                    self.paused_beat = beat;
                }
            }
            ClockCommand::Tempo { time, bpm } => {
                if !time.is_finite() || !bpm.is_finite() {
                    return;
                }
                let time = self.not_before_now(time, now);
                self.make_room(now);
                self.tempo.override_from(time, bpm);
            }
            ClockCommand::ScheduleTempo { time, bpm } => {
                if !time.is_finite() || !bpm.is_finite() {
                    return;
                }
                let time = self.not_before_now(time, now);
                self.make_room(now);
                self.tempo.insert(time, bpm);
            }
        }
    }

    fn process<S: ReportSink<ClockReport>>(
        &mut self,
        ctx: &RenderCtx,
        _inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        let now = ctx.current_time();
        let bpm = self.tempo.bpm_at(now);
        let period = self.samples_per_pulse(bpm);
        // Keep a low half-cycle at high tempi
        let width = self.pulse_width.min((period / 2).max(1));

        for i in 0..ctx.frames {
            let pulse = if self.running {
                self.train.next_sample(period, width)
            } else {
                self.train.reset();
                0.0
            };
            write_output(outputs, 0, i, pulse);
            write_output(outputs, 1, i, self.start_pulse.next_sample());
            write_output(outputs, 2, i, self.stop_pulse.next_sample());
        }

        if now >= self.next_tick {
            reports.emit(ClockReport::Tick {
                time: now,
                beat: self.beat_at(now),
                bpm,
                running: self.running,
            });
            self.next_tick = now + self.tick_interval;
        }
    }
}

//! Transport - audio setup and the render callback

use std::{
    f32::consts::TAU,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use pulse_transport::{
    engine::{GateDetector, MasterClock, StepSequencer},
    io::{ClockCommand, SequencerCommand},
    runtime::{NodeId, ProcessorRegistry, RenderGraph},
    sequencing::{Pattern, PatternUpdate},
    EngineConfig,
};

use super::ui::{Panel, TransportUi};

/// Pitch of CV 0.0
const ROOT_HZ: f32 = 110.0;
/// Per-sample envelope smoothing toward the gate level
const ENV_COEFF: f32 = 0.004;

/// Builder for the front panel
pub struct Transport {
    bpm: f64,
    pattern: PatternUpdate,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            bpm: 120.0,
            pattern: PatternUpdate::default(),
        }
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn pattern(mut self, pattern: PatternUpdate) -> Self {
        self.pattern = pattern;
        self
    }

    /// Open the default output device, start the clock and hand the terminal
    /// to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;
        tracing::info!(sample_rate, channels, "output device opened");

        let config = EngineConfig::default().with_sample_rate(sample_rate);
        let registry = ProcessorRegistry::with_all(config.clone());
        let (clock, mut clock_handle) = registry.instantiate::<MasterClock>()?;
        let (seq, mut seq_handle) = registry.instantiate::<StepSequencer>()?;
        let (gate, gate_handle) = registry.instantiate::<GateDetector>()?;

        let mut graph = RenderGraph::new(sample_rate, config.effective_quantum_frames());
        let clock = graph.add(clock);
        let seq = graph.add(seq);
        let gate = graph.add(gate);
        graph.connect(clock, 0, seq, 0)?;
        graph.connect(seq, 1, gate, 0)?;

        let pattern = Pattern::from(self.pattern);
        let steps = pattern.steps().to_vec();
        clock_handle.send(ClockCommand::Init {
            bpm: self.bpm,
            start_beat: 0.0,
            tick_interval_sec: config.clock.tick_interval_seconds,
        })?;
        seq_handle.send(SequencerCommand::State(pattern))?;
        clock_handle.send(ClockCommand::Start {
            time: 0.0,
            beat: 0.0,
        })?;

        let frame = Arc::new(AtomicU64::new(0));
        let mut render = RenderState {
            graph,
            seq,
            voice: Voice::new(sample_rate),
            frame: Arc::clone(&frame),
        };

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| render.fill(data, channels),
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let panel = Panel {
            clock: clock_handle,
            sequencer: seq_handle,
            gate: gate_handle,
            frame,
            sample_rate,
            steps,
            bpm: self.bpm,
        };

        let mut terminal = ratatui::init();
        let result = TransportUi::new(panel).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the audio callback owns
struct RenderState {
    graph: RenderGraph,
    seq: NodeId,
    voice: Voice,
    frame: Arc<AtomicU64>,
}

impl RenderState {
    fn fill(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let total = data.len() / channels;
        let mut written = 0;

        while written < total {
            let ctx = self.graph.render_quantum(total - written);
            let (Some(cv), Some(gate)) = (
                self.graph.output(self.seq, 0),
                self.graph.output(self.seq, 1),
            ) else {
                data.fill(0.0);
                return;
            };

            let out = &mut data[written * channels..(written + ctx.frames) * channels];
            for (frame, (&cv, &gate)) in out.chunks_mut(channels).zip(cv.iter().zip(gate)) {
                frame.fill(self.voice.next(cv, gate));
            }
            written += ctx.frames;
        }

        self.frame.store(self.graph.frame(), Ordering::Relaxed);
    }
}

/// Sine voice pitched by the sequencer CV and keyed by its gate
struct Voice {
    sample_rate: f32,
    phase: f32,
    env: f32,
}

impl Voice {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            env: 0.0,
        }
    }

    fn next(&mut self, cv: f32, gate: f32) -> f32 {
        let freq = ROOT_HZ * (cv / 12.0).exp2();
        self.phase = (self.phase + freq / self.sample_rate).fract();
        self.env += (gate - self.env) * ENV_COEFF;
        (self.phase * TAU).sin() * self.env * 0.3
    }
}

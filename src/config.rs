//! Engine configuration.
//!
//! Everything here is plain data supplied by the component layer when an
//! audio context is created. Values are sanitized where they are consumed, so
//! a config deserialized from an untrusted source can never stall rendering.

use crate::RENDER_QUANTUM;

/// Audio-context wide settings plus per-processor defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Audio sample rate in Hz
    pub sample_rate: f32,
    /// Frames per render quantum
    pub quantum_frames: usize,
    /// Capacity of each command/report ring buffer
    pub queue_capacity: usize,
    pub clock: ClockConfig,
    pub sequencer: SequencerConfig,
    pub detector: DetectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            quantum_frames: RENDER_QUANTUM,
            queue_capacity: 256,
            clock: ClockConfig::default(),
            sequencer: SequencerConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_quantum_frames(mut self, frames: usize) -> Self {
        self.quantum_frames = frames;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sequencer(mut self, sequencer: SequencerConfig) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Sample rate with a usable fallback for zero, negative or NaN values.
    pub fn effective_sample_rate(&self) -> f32 {
        if self.sample_rate.is_finite() && self.sample_rate > 0.0 {
            self.sample_rate
        } else {
            48_000.0
        }
    }

    /// Queue capacity, never below one slot.
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Quantum size bounded to `1..=MAX_BLOCK_SIZE`.
    pub fn effective_quantum_frames(&self) -> usize {
        self.quantum_frames.clamp(1, crate::MAX_BLOCK_SIZE)
    }
}

/// Master clock defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClockConfig {
    /// Initial tempo in beats per minute
    pub bpm: f64,
    /// Initial transport position in beats
    pub start_beat: f64,
    /// Seconds of audio time between `tick` reports
    pub tick_interval_seconds: f64,
    /// Width of every clock, start and stop pulse
    pub pulse_width_seconds: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            start_beat: 0.0,
            tick_interval_seconds: 0.025,
            pulse_width_seconds: 0.010,
        }
    }
}

impl ClockConfig {
    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_tick_interval(mut self, seconds: f64) -> Self {
        self.tick_interval_seconds = seconds;
        self
    }

    pub fn with_pulse_width(mut self, seconds: f64) -> Self {
        self.pulse_width_seconds = seconds;
        self
    }
}

/// Step sequencer defaults, used until the first `state` message arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequencerConfig {
    /// Glide time for slide steps, in seconds
    pub slide_time: f32,
    /// Step interval assumed before one has been measured, in seconds
    pub base_gate_seconds: f32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            slide_time: 0.05,
            base_gate_seconds: 0.125,
        }
    }
}

/// Thresholds and windows for the edge detectors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Rising crossing level for the pulse detector
    pub pulse_threshold: f32,
    /// Samples after a pulse during which further crossings are ignored
    pub pulse_cooldown_samples: u32,
    /// Gate detector turns on above this level
    pub gate_rise: f32,
    /// Gate detector turns off below this level
    pub gate_fall: f32,
    /// Samples averaged per CV follower report
    pub cv_block_samples: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            pulse_threshold: 0.5,
            pulse_cooldown_samples: 32,
            gate_rise: 0.5,
            gate_fall: 0.2,
            cv_block_samples: 256,
        }
    }
}

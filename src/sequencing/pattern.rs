//! Step patterns for the step sequencer.
//!
//! A [`PatternUpdate`] is what the component layer sends: a growable list of
//! steps plus the length it wants, with no guarantees about ranges. It is
//! turned into a [`Pattern`] on the control thread, which fixes the length,
//! clamps every field and stores the steps inline so the render thread can
//! swap patterns without touching the allocator.

use arrayvec::ArrayVec;

use super::division::Division;
use crate::config::SequencerConfig;

/// Longest pattern the sequencer holds.
pub const MAX_STEPS: usize = 32;

pub const MIN_LENGTH_PCT: f32 = 10.0;
pub const MAX_LENGTH_PCT: f32 = 100.0;
pub const MAX_SWING: f32 = 50.0;

/// One step of a pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Step {
    /// Whether the step opens the gate
    pub active: bool,
    /// CV target
    pub value: f32,
    /// Gate length as a percentage of the step interval
    pub length_pct: f32,
    /// Glide into this step from an active predecessor
    pub slide: bool,
    pub accent: bool,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            active: false,
            value: 0.0,
            length_pct: 50.0,
            slide: false,
            accent: false,
        }
    }
}

impl Step {
    /// An active step at `value` with default length.
    pub fn on(value: f32) -> Self {
        Self {
            active: true,
            value,
            ..Self::default()
        }
    }

    /// An inactive step.
    pub fn rest() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, length_pct: f32) -> Self {
        self.length_pct = length_pct;
        self
    }

    pub fn with_slide(mut self, slide: bool) -> Self {
        self.slide = slide;
        self
    }

    pub fn with_accent(mut self, accent: bool) -> Self {
        self.accent = accent;
        self
    }

    /// Coerce non-finite values to 0 and clamp the length.
    pub fn sanitized(self) -> Self {
        let value = if self.value.is_finite() {
            self.value
        } else {
            0.0
        };
        let length_pct = if self.length_pct.is_finite() {
            self.length_pct.clamp(MIN_LENGTH_PCT, MAX_LENGTH_PCT)
        } else {
            MAX_LENGTH_PCT
        };
        Self {
            value,
            length_pct,
            ..self
        }
    }
}

/// Body of a sequencer `state` message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PatternUpdate {
    pub steps: Vec<Step>,
    /// Desired number of steps; defaults to `steps.len()`
    pub length: Option<usize>,
    /// Note-value selector, see [`Division`]
    pub division: i32,
    /// Lengthen every step by half
    pub dotted: bool,
    /// Percent in [-50, 50]; positive delays odd steps, negative even steps
    pub swing: f32,
    /// Glide time in seconds
    pub slide_time: f32,
    /// Step interval assumed before one has been measured, in seconds
    pub base_gate_seconds: f32,
}

impl Default for PatternUpdate {
    fn default() -> Self {
        let config = SequencerConfig::default();
        Self {
            steps: Vec::new(),
            length: None,
            division: Division::default().selector(),
            dotted: false,
            swing: 0.0,
            slide_time: config.slide_time,
            base_gate_seconds: config.base_gate_seconds,
        }
    }
}

impl PatternUpdate {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn division(mut self, division: i32) -> Self {
        self.division = division;
        self
    }

    pub fn dotted(mut self, dotted: bool) -> Self {
        self.dotted = dotted;
        self
    }

    pub fn swing(mut self, swing: f32) -> Self {
        self.swing = swing;
        self
    }

    pub fn slide_time(mut self, seconds: f32) -> Self {
        self.slide_time = seconds;
        self
    }

    pub fn base_gate_seconds(mut self, seconds: f32) -> Self {
        self.base_gate_seconds = seconds;
        self
    }
}

/// A sanitized, fixed-capacity pattern ready for the render thread.
///
/// Invariant: holds between 1 and [`MAX_STEPS`] steps, every step sanitized,
/// swing in [-50, 50], times finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "PatternUpdate"))]
pub struct Pattern {
    steps: ArrayVec<Step, MAX_STEPS>,
    division: Division,
    swing: f32,
    slide_time: f32,
    base_gate_seconds: f32,
}

impl Pattern {
    /// Resynchronize the step list to the requested length (truncating or
    /// padding with inactive steps) and clamp every field.
    pub fn from_update(update: &PatternUpdate) -> Self {
        let defaults = SequencerConfig::default();
        let length = update
            .length
            .unwrap_or(update.steps.len())
            .clamp(1, MAX_STEPS);

        let steps = update
            .steps
            .iter()
            .copied()
            .chain(std::iter::repeat(Step::rest()))
            .take(length)
            .map(Step::sanitized)
            .collect();

        let division = if update.dotted {
            Division::new(update.division).dotted()
        } else {
            Division::new(update.division)
        };

        let swing = if update.swing.is_finite() {
            update.swing.clamp(-MAX_SWING, MAX_SWING)
        } else {
            0.0
        };

        Self {
            steps,
            division,
            swing,
            slide_time: non_negative_or(update.slide_time, defaults.slide_time),
            base_gate_seconds: positive_or(update.base_gate_seconds, defaults.base_gate_seconds),
        }
    }

    /// All-rest pattern used before the first `state` message.
    pub fn silent(length: usize, config: &SequencerConfig) -> Self {
        let defaults = SequencerConfig::default();
        Self {
            steps: (0..length.clamp(1, MAX_STEPS)).map(|_| Step::rest()).collect(),
            division: Division::default(),
            swing: 0.0,
            slide_time: non_negative_or(config.slide_time, defaults.slide_time),
            base_gate_seconds: positive_or(config.base_gate_seconds, defaults.base_gate_seconds),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, wrapping around the pattern length.
    pub fn step(&self, index: usize) -> Step {
        match self.steps.len() {
            0 => Step::rest(),
            len => self.steps[index % len],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn pulses_per_step(&self) -> f64 {
        self.division.pulses_per_step()
    }

    pub fn swing(&self) -> f32 {
        self.swing
    }

    pub fn slide_time(&self) -> f32 {
        self.slide_time
    }

    pub fn base_gate_seconds(&self) -> f32 {
        self.base_gate_seconds
    }
}

impl From<PatternUpdate> for Pattern {
    fn from(update: PatternUpdate) -> Self {
        Pattern::from_update(&update)
    }
}

fn non_negative_or(x: f32, fallback: f32) -> f32 {
    if x.is_finite() && x >= 0.0 {
        x
    } else {
        fallback
    }
}

fn positive_or(x: f32, fallback: f32) -> f32 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        fallback
    }
}

//! Messages exchanged between the control thread and the processors.
//!
//! Commands flow in and are applied at the start of the next quantum; reports
//! flow out and are fire-and-forget. Every type here is moved through an
//! `rtrb` ring buffer, so none of them borrow.

use crate::sequencing::{EventList, Pattern, PatternUpdate};

/// Commands for the master clock. Times are absolute audio-thread seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")
)]
pub enum ClockCommand {
    /// Reset the tempo map to a single tempo and rewind the pulse phase
    Init {
        bpm: f64,
        start_beat: f64,
        tick_interval_sec: f64,
    },
    Start { time: f64, beat: f64 },
    Stop { time: f64 },
    Seek { time: f64, beat: f64 },
    /// Change tempo at `time`, discarding later tempo changes
    Tempo { time: f64, bpm: f64 },
    /// Add a tempo change at `time`, keeping later ones
    ScheduleTempo { time: f64, bpm: f64 },
}

/// Periodic transport position report.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum ClockReport {
    Tick {
        time: f64,
        beat: f64,
        bpm: f64,
        running: bool,
    },
}

/// Commands for the step sequencer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum SequencerCommand {
    /// Replace the pattern wholesale
    State(Pattern),
    /// Snap back to step 0 and clear all timing state
    Reset,
}

impl SequencerCommand {
    /// Sanitize a `state` message body into a command.
    pub fn state(update: PatternUpdate) -> Self {
        SequencerCommand::State(Pattern::from(update))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")
)]
pub enum SequencerReport {
    /// Emitted when a step is applied, at audio-accurate time
    Step { current_step: usize },
}

/// Commands for the event scheduler. Positions are pattern-relative seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        tag = "type",
        rename_all = "kebab-case",
        rename_all_fields = "camelCase",
        bound(deserialize = "E: serde::Deserialize<'de>")
    )
)]
pub enum SchedulerCommand<E> {
    /// Replace the event list and rewind the cursor
    Events { list: EventList<E> },
    /// Tempo-scale factor applied to all future event times
    Scale { value: f64 },
    Play {
        start_time: f64,
        position: f64,
        scale: f64,
    },
    /// Halt without moving the cursor
    Stop,
    Seek { position: f64 },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        tag = "type",
        rename_all = "kebab-case",
        bound(serialize = "E: serde::Serialize")
    )
)]
pub enum SchedulerReport<E> {
    /// A due event with its absolute audio-thread time
    Event { event: E, time: f64 },
    /// The cursor passed the last event
    End,
    /// An event list replaced by `events`, returned to be freed off the
    /// render thread
    #[cfg_attr(feature = "serde", serde(skip))]
    Retired { list: EventList<E> },
}

/// Reports from the edge detectors and the CV follower.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum DetectorReport {
    Pulse { time: f64 },
    GateOn { time: f64 },
    GateOff { time: f64 },
    Cv { value: f32 },
}

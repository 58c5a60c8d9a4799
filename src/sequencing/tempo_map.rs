//! Piecewise-constant tempo over absolute audio time.
//!
//! The map is the single source of truth for converting audio-thread seconds
//! into beats. It lives inside the master clock and is mutated only on the
//! render thread, so storage is a fixed-capacity `ArrayVec`.

use arrayvec::ArrayVec;

/// Maximum number of tempo changes held at once.
pub const TEMPO_MAP_CAPACITY: usize = 64;

pub const MIN_BPM: f64 = 1.0;
pub const MAX_BPM: f64 = 999.0;

/// Bound a tempo to the supported range; NaN becomes the minimum.
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        MIN_BPM
    } else {
        bpm.clamp(MIN_BPM, MAX_BPM)
    }
}

/// Tempo takes effect at `at_time` and holds until the next event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoEvent {
    /// Absolute audio-thread time in seconds
    pub at_time: f64,
    pub bpm: f64,
}

/// Ordered, deduplicated list of tempo events. Never empty.
#[derive(Debug, Clone)]
pub struct TempoMap {
    events: ArrayVec<TempoEvent, TEMPO_MAP_CAPACITY>,
}

impl TempoMap {
    /// A map holding a single tempo from time zero.
    pub fn new(bpm: f64) -> Self {
        let mut map = Self {
            events: ArrayVec::new(),
        };
        map.reset(0.0, bpm);
        map
    }

    /// Discard everything and start over with one event.
    pub fn reset(&mut self, at_time: f64, bpm: f64) {
        self.events.clear();
        self.events.push(TempoEvent {
            at_time,
            bpm: clamp_bpm(bpm),
        });
    }

    /// Tempo in effect at `time`.
    ///
    /// Times before the first event use the first event's tempo.
    pub fn bpm_at(&self, time: f64) -> f64 {
        let idx = self.events.partition_point(|e| e.at_time <= time);
        let event = if idx == 0 {
            self.events.first()
        } else {
            self.events.get(idx - 1)
        };
        event.map_or(MIN_BPM, |e| e.bpm)
    }

    /// Add a tempo change, keeping later events (additive automation).
    ///
    /// An event at an existing time replaces it. When the map is full the
    /// latest event is dropped to make room.
    pub fn insert(&mut self, at_time: f64, bpm: f64) {
        let event = TempoEvent {
            at_time,
            bpm: clamp_bpm(bpm),
        };
        let idx = self.events.partition_point(|e| e.at_time < at_time);
        if let Some(existing) = self.events.get_mut(idx) {
            if existing.at_time == at_time {
                *existing = event;
                return;
            }
        }
        if self.events.is_full() {
            self.events.pop();
        }
        let idx = idx.min(self.events.len());
        self.events.insert(idx, event);
    }

    /// Add a tempo change and drop every event after it (immediate override).
    pub fn override_from(&mut self, at_time: f64, bpm: f64) {
        self.events.retain(|e| e.at_time <= at_time);
        if self.events.is_empty() {
            self.reset(at_time, bpm);
        } else {
            self.insert(at_time, bpm);
        }
    }

    /// Collapse everything at or before `at_time` into one event carrying the
    /// tempo in effect then. Later events are kept.
    pub fn rebase(&mut self, at_time: f64) {
        let bpm = self.bpm_at(at_time);
        self.events.retain(|e| e.at_time > at_time);
        if self.events.is_full() {
            self.events.pop();
        }
        self.events.insert(0, TempoEvent { at_time, bpm });
    }

    /// Remove events that can no longer affect any time at or after `time`.
    ///
    /// The event in effect at `time` is kept.
    pub fn prune_before(&mut self, time: f64) {
        let idx = self.events.partition_point(|e| e.at_time <= time);
        if idx > 1 {
            self.events.drain(..idx - 1);
        }
    }

    /// Beats elapsed between two absolute times, integrated segment by
    /// segment. Zero when `to <= from`.
    pub fn beats_between(&self, from: f64, to: f64) -> f64 {
        if !(to > from) {
            return 0.0;
        }

        let mut beats = 0.0;
        let mut cursor = from;
        let mut bpm = self.bpm_at(from);

        for event in self
            .events
            .iter()
            .skip_while(|e| e.at_time <= from)
            .take_while(|e| e.at_time < to)
        {
            beats += (event.at_time - cursor) * bpm / 60.0;
            cursor = event.at_time;
            bpm = event.bpm;
        }

        beats + (to - cursor) * bpm / 60.0
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    pub fn events(&self) -> &[TempoEvent] {
        &self.events
    }
}

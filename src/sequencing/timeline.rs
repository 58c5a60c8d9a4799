/// A payload tagged with its pattern-relative time in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedEvent<E> {
    pub time: f64,
    pub payload: E,
}

impl<E> TimedEvent<E> {
    pub fn new(time: f64, payload: E) -> Self {
        Self { time, payload }
    }
}

/// Immutable, time-sorted event list for the event scheduler.
///
/// Built on the control thread: events with non-finite or negative times are
/// dropped and the rest sorted with a stable sort, so simultaneous events
/// keep their submission order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        from = "Vec<TimedEvent<E>>",
        bound(deserialize = "E: serde::Deserialize<'de>")
    )
)]
pub struct EventList<E> {
    events: Vec<TimedEvent<E>>,
}

impl<E> EventList<E> {
    pub fn new(events: Vec<TimedEvent<E>>) -> Self {
        let mut events: Vec<_> = events
            .into_iter()
            .filter(|e| e.time.is_finite() && e.time >= 0.0)
            .collect();
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { events }
    }

    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimedEvent<E>> {
        self.events.get(index)
    }

    /// Pattern time of the last event, 0 for an empty list.
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    /// Index of the first event at or after `position`.
    pub fn index_at(&self, position: f64) -> usize {
        self.events.partition_point(|e| e.time < position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent<E>> {
        self.events.iter()
    }
}

impl<E> Default for EventList<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E> From<Vec<TimedEvent<E>>> for EventList<E> {
    fn from(events: Vec<TimedEvent<E>>) -> Self {
        Self::new(events)
    }
}

impl<E> FromIterator<TimedEvent<E>> for EventList<E> {
    fn from_iter<I: IntoIterator<Item = TimedEvent<E>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

//! Control-side hold queue for scheduler events.
//!
//! The event scheduler emits up to one quantum early. The dispatcher holds
//! what it emits and releases each event once the caller's clock reaches its
//! due time, earliest first. Events due at the same time come out in the
//! order they were accepted.

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::io::SchedulerReport;

struct Pending<E> {
    time: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Pending<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Pending<E> {}

impl<E> PartialOrd for Pending<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Pending<E> {
    // Reversed: BinaryHeap pops the greatest, we want the earliest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct DeferredDispatcher<E> {
    pending: BinaryHeap<Pending<E>>,
    capacity: usize,
    next_seq: u64,
    ended: bool,
}

impl<E> DeferredDispatcher<E> {
    /// A dispatcher holding at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: BinaryHeap::with_capacity(capacity),
            capacity: capacity.max(1),
            next_seq: 0,
            ended: false,
        }
    }

    /// Hold `event` until `time`. Returns false if the dispatcher is full and
    /// the event was dropped.
    pub fn push(&mut self, time: f64, event: E) -> bool {
        if self.pending.len() >= self.capacity {
            tracing::warn!(time, capacity = self.capacity, "dispatcher full, event dropped");
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { time, seq, event });
        true
    }

    /// Take one scheduler report. `end` is remembered until every held event
    /// has been released; a retired list is dropped here.
    pub fn accept(&mut self, report: SchedulerReport<E>) -> bool {
        match report {
            SchedulerReport::Event { event, time } => self.push(time, event),
            SchedulerReport::End => {
                self.ended = true;
                true
            }
            SchedulerReport::Retired { .. } => true,
        }
    }

    /// Release every event due at or before `now`, earliest first.
    pub fn poll(&mut self, now: f64) -> impl Iterator<Item = (f64, E)> + '_ {
        std::iter::from_fn(move || {
            if self.pending.peek()?.time <= now {
                self.pending.pop().map(|p| (p.time, p.event))
            } else {
                None
            }
        })
    }

    /// Release everything regardless of due time.
    pub fn flush(&mut self) -> impl Iterator<Item = (f64, E)> + '_ {
        std::iter::from_fn(move || self.pending.pop().map(|p| (p.time, p.event)))
    }

    /// Drop everything held, including a pending end.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.ended = false;
    }

    /// Due time of the next event, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.peek().map(|p| p.time)
    }

    /// True once `end` was accepted and every held event has been released.
    /// Reading it clears the flag.
    pub fn take_end(&mut self) -> bool {
        if self.ended && self.pending.is_empty() {
            self.ended = false;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

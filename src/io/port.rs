//! Ring-buffer ports between the control thread and one processor.
//!
//! Each processor gets two single-producer/single-consumer queues: commands in,
//! reports out. The render side never blocks: commands are popped until the
//! queue is empty and reports that do not fit are dropped and counted.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{engine::Processor, error::PortError};

/// Destination for reports produced while rendering.
pub trait ReportSink<R> {
    fn emit(&mut self, report: R);

    /// Emit `report` only if there is room, handing it back otherwise.
    fn try_emit(&mut self, report: R) -> Result<(), R> {
        self.emit(report);
        Ok(())
    }
}

impl<R> ReportSink<R> for Vec<R> {
    fn emit(&mut self, report: R) {
        self.push(report);
    }
}

/// Render-side report queue that counts what it had to drop.
pub struct ReportPort<R> {
    tx: Producer<R>,
    dropped: Arc<AtomicU64>,
}

impl<R> ReportSink<R> for ReportPort<R> {
    fn emit(&mut self, report: R) {
        if self.tx.push(report).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn try_emit(&mut self, report: R) -> Result<(), R> {
        self.tx.push(report).map_err(|PushError::Full(report)| report)
    }
}

/// Render-side ends of a processor's queues, owned by its `Node`.
pub struct RenderPort<P: Processor> {
    pub(crate) commands: Consumer<P::Command>,
    pub(crate) reports: ReportPort<P::Report>,
}

/// Control-side ends of a processor's queues.
pub struct Handle<P: Processor> {
    commands: Producer<P::Command>,
    reports: Consumer<P::Report>,
    dropped: Arc<AtomicU64>,
}

/// Create both ends of a processor's queues, each holding `capacity` messages.
pub fn port<P: Processor>(capacity: usize) -> (RenderPort<P>, Handle<P>) {
    let capacity = capacity.max(1);
    let (command_tx, command_rx) = RingBuffer::<P::Command>::new(capacity);
    let (report_tx, report_rx) = RingBuffer::<P::Report>::new(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    let render = RenderPort {
        commands: command_rx,
        reports: ReportPort {
            tx: report_tx,
            dropped: Arc::clone(&dropped),
        },
    };
    let handle = Handle {
        commands: command_tx,
        reports: report_rx,
        dropped,
    };

    (render, handle)
}

impl<P: Processor> Handle<P> {
    /// Queue a command for the start of the next quantum.
    pub fn send(&mut self, command: P::Command) -> Result<(), PortError> {
        if self.commands.is_abandoned() {
            return Err(PortError::Disconnected);
        }
        match self.commands.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(_)) => Err(PortError::Full),
        }
    }

    /// Like `send`, but a rejected command is logged and discarded.
    pub fn send_or_log(&mut self, command: P::Command) {
        if let Err(err) = self.send(command) {
            tracing::warn!(processor = %P::KIND, error = %err, "command dropped");
        }
    }

    /// Next pending report, if any.
    pub fn try_recv(&mut self) -> Option<P::Report> {
        self.reports.pop().ok()
    }

    /// All reports pending right now, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = P::Report> + '_ {
        std::iter::from_fn(move || self.reports.pop().ok())
    }

    /// Reports discarded on the render side because this queue was full.
    pub fn dropped_reports(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Commands that can be sent before the queue is full.
    pub fn free_slots(&self) -> usize {
        self.commands.slots()
    }

    pub fn is_connected(&self) -> bool {
        !self.commands.is_abandoned()
    }
}

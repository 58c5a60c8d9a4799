// Purpose - message types and the queues that carry them across threads

pub mod message;
pub mod port;

pub use message::{
    ClockCommand, ClockReport, DetectorReport, SchedulerCommand, SchedulerReport,
    SequencerCommand, SequencerReport,
};
pub use port::{port, Handle, RenderPort, ReportPort, ReportSink};

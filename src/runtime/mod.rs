//! Control-side hosting for the render-thread processors.
//!
//! Everything here runs off the render thread except `RenderGraph::render_quantum`,
//! which is what the audio callback calls.
//!
//! # Example
//!
//! ```ignore
//! use pulse_transport::{runtime::*, engine::*, io::ClockCommand, EngineConfig};
//!
//! let registry = ProcessorRegistry::with_all(EngineConfig::default());
//! let (clock, mut transport) = registry.instantiate::<MasterClock>()?;
//! let (seq, _steps) = registry.instantiate::<StepSequencer>()?;
//!
//! let mut graph = RenderGraph::new(48_000.0, 128);
//! let clock = graph.add(clock);
//! let seq = graph.add(seq);
//! graph.connect(clock, 0, seq, 0)?;
//!
//! transport.send(ClockCommand::Start { time: 0.0, beat: 0.0 })?;
//! graph.render_quantum(128);
//! ```

mod dispatch;
mod graph;
mod registry;

pub use dispatch::DeferredDispatcher;
pub use graph::{NodeId, RenderGraph, MAX_PORTS};
pub use registry::ProcessorRegistry;

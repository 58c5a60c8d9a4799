pub mod config;
pub mod dsp; // Per-sample edge, ramp and pulse primitives
pub mod engine; // Render-thread processors
pub mod error;
pub mod io; // Commands, reports and ring-buffer ports
pub mod runtime; // Control-side hosting: registry, graph, dispatch
pub mod sequencing; // Tempo map, patterns and divisions

pub use config::{ClockConfig, DetectorConfig, EngineConfig, SequencerConfig};
pub use engine::{AudioNode, Node, Processor, ProcessorKind, RenderCtx};
pub use error::{GraphError, PortError, RegistryError};
pub use io::Handle;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Frames per render quantum unless configured otherwise.
pub const RENDER_QUANTUM: usize = 128;

/// Pulses per quarter note written by the master clock.
pub const CLOCK_PPQ: u32 = 16;

/// Level above which an audio-rate pulse or gate counts as high.
pub const HIGH_THRESHOLD: f32 = 0.5;

use super::{Processor, ProcessorKind};
use crate::io::{port, Handle, RenderPort};

/// Context passed to processors for one render quantum
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - current_frame: Absolute index of the quantum's first sample
/// - frames: Number of samples in the quantum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub current_frame: u64,
    pub frames: usize,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, current_frame: u64, frames: usize) -> Self {
        Self {
            sample_rate,
            current_frame,
            frames,
        }
    }

    /// Absolute audio-thread time of the quantum's first sample, in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame as f64 / self.sample_rate as f64
    }

    /// Absolute time of sample `i` of this quantum.
    pub fn time_at(&self, i: usize) -> f64 {
        (self.current_frame + i as u64) as f64 / self.sample_rate as f64
    }

    /// Absolute time just past the quantum's last sample.
    pub fn end_time(&self) -> f64 {
        self.time_at(self.frames)
    }

    /// Context for the quantum that follows this one.
    pub fn next(&self) -> Self {
        Self {
            current_frame: self.current_frame + self.frames as u64,
            ..*self
        }
    }
}

/// Object-safe view of a processor for graph hosting
///
/// Render graphs hold heterogeneous processors as `Box<dyn AudioNode>`.
pub trait AudioNode: Send {
    fn kind(&self) -> ProcessorKind;

    fn num_inputs(&self) -> usize;

    fn num_outputs(&self) -> usize;

    /// Apply pending commands, then render one quantum.
    fn render(&mut self, ctx: &RenderCtx, inputs: &[&[f32]], outputs: &mut [&mut [f32]]);
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl AudioNode for Box<dyn AudioNode> {
    fn kind(&self) -> ProcessorKind {
        (**self).kind()
    }

    fn num_inputs(&self) -> usize {
        (**self).num_inputs()
    }

    fn num_outputs(&self) -> usize {
        (**self).num_outputs()
    }

    fn render(&mut self, ctx: &RenderCtx, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        (**self).render(ctx, inputs, outputs)
    }
}

/// A processor bound to its command and report queues.
pub struct Node<P: Processor> {
    processor: P,
    port: RenderPort<P>,
}

impl<P: Processor> Node<P> {
    /// Wrap `processor` and return the control-side handle for it.
    pub fn new(processor: P, capacity: usize) -> (Self, Handle<P>) {
        let (port, handle) = port::<P>(capacity);
        (Self { processor, port }, handle)
    }

    /// Drain pending commands, then render one quantum.
    pub fn render_quantum(
        &mut self,
        ctx: &RenderCtx,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) {
        while let Ok(command) = self.port.commands.pop() {
            self.processor.handle_command(command, ctx);
        }
        self.processor
            .process(ctx, inputs, outputs, &mut self.port.reports);
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }
}

impl<P: Processor> AudioNode for Node<P> {
    fn kind(&self) -> ProcessorKind {
        P::KIND
    }

    fn num_inputs(&self) -> usize {
        P::INPUTS
    }

    fn num_outputs(&self) -> usize {
        P::OUTPUTS
    }

    fn render(&mut self, ctx: &RenderCtx, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        self.render_quantum(ctx, inputs, outputs);
    }
}

//! Fixed-order render graph.
//!
//! Nodes render in the order they were added. A connection always runs from
//! an earlier node's output to a later node's input, so one pass in insertion
//! order sees every input already rendered for the current quantum. Each input
//! takes at most one connection; unconnected inputs read as silence.
//!
//! Output buffers are allocated when a node is added. Rendering allocates
//! nothing.

use arrayvec::ArrayVec;

use crate::{
    engine::{AudioNode, ProcessorKind, RenderCtx},
    error::GraphError,
    MAX_BLOCK_SIZE,
};

/// Index of a node in its graph.
pub type NodeId = usize;

/// Most inputs or outputs a hosted node can expose.
pub const MAX_PORTS: usize = 4;

/// Upstream end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Source {
    node: NodeId,
    port: usize,
}

struct Slot {
    node: Box<dyn AudioNode>,
    inputs: ArrayVec<Option<Source>, MAX_PORTS>,
    outputs: ArrayVec<Vec<f32>, MAX_PORTS>,
}

pub struct RenderGraph {
    sample_rate: f32,
    max_frames: usize,
    frame: u64,
    rendered: usize,
    slots: Vec<Slot>,
}

impl RenderGraph {
    pub fn new(sample_rate: f32, max_frames: usize) -> Self {
        Self {
            sample_rate,
            max_frames: max_frames.clamp(1, MAX_BLOCK_SIZE),
            frame: 0,
            rendered: 0,
            slots: Vec::new(),
        }
    }

    /// Append a node; it renders after every node added before it.
    ///
    /// Ports beyond [`MAX_PORTS`] are not hosted.
    pub fn add<N: AudioNode + 'static>(&mut self, node: N) -> NodeId {
        let inputs = (0..node.num_inputs().min(MAX_PORTS)).map(|_| None).collect();
        let outputs = (0..node.num_outputs().min(MAX_PORTS))
            .map(|_| vec![0.0; self.max_frames])
            .collect();
        let id = self.slots.len();
        tracing::debug!(node = id, processor = %node.kind(), "node added");
        self.slots.push(Slot {
            node: Box::new(node),
            inputs,
            outputs,
        });
        id
    }

    /// Feed output `output` of `from` into input `input` of `to`.
    pub fn connect(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<(), GraphError> {
        let source = self.slots.get(from).ok_or(GraphError::UnknownNode(from))?;
        if output >= source.outputs.len() {
            return Err(GraphError::NoSuchOutput {
                node: from,
                port: output,
            });
        }
        if to <= from {
            return Err(GraphError::Cycle { from, to });
        }

        let target = self.slots.get_mut(to).ok_or(GraphError::UnknownNode(to))?;
        let slot = target
            .inputs
            .get_mut(input)
            .ok_or(GraphError::NoSuchInput {
                node: to,
                port: input,
            })?;
        if slot.is_some() {
            return Err(GraphError::InputOccupied {
                node: to,
                port: input,
            });
        }
        *slot = Some(Source {
            node: from,
            port: output,
        });

        tracing::debug!(from, output, to, input, "connected");
        Ok(())
    }

    /// Remove whatever feeds input `input` of `to`. Returns whether a
    /// connection was removed.
    pub fn disconnect(&mut self, to: NodeId, input: usize) -> Result<bool, GraphError> {
        let target = self.slots.get_mut(to).ok_or(GraphError::UnknownNode(to))?;
        let slot = target
            .inputs
            .get_mut(input)
            .ok_or(GraphError::NoSuchInput {
                node: to,
                port: input,
            })?;
        let removed = slot.take().is_some();
        if removed {
            tracing::debug!(to, input, "disconnected");
        }
        Ok(removed)
    }

    /// Render every node for the next `frames` samples (capped at the graph's
    /// maximum quantum) and return the context that was rendered.
    pub fn render_quantum(&mut self, frames: usize) -> RenderCtx {
        let frames = frames.min(self.max_frames);
        let ctx = RenderCtx::new(self.sample_rate, self.frame, frames);

        for idx in 0..self.slots.len() {
            let (rendered, rest) = self.slots.split_at_mut(idx);
            let Some(Slot {
                node,
                inputs,
                outputs,
            }) = rest.first_mut()
            else {
                continue;
            };

            let ins: ArrayVec<&[f32], MAX_PORTS> = inputs
                .iter()
                .map(|source| match source {
                    Some(src) => rendered
                        .get(src.node)
                        .and_then(|slot| slot.outputs.get(src.port))
                        .map_or(&[][..], |buf| &buf[..frames]),
                    None => &[][..],
                })
                .collect();
            let mut outs: ArrayVec<&mut [f32], MAX_PORTS> =
                outputs.iter_mut().map(|buf| &mut buf[..frames]).collect();
            for out in outs.iter_mut() {
                out.fill(0.0);
            }

            node.render(&ctx, &ins, &mut outs);
        }

        self.frame += frames as u64;
        self.rendered = frames;
        ctx
    }

    /// Output `port` of `node` from the most recent quantum.
    pub fn output(&self, node: NodeId, port: usize) -> Option<&[f32]> {
        self.slots
            .get(node)
            .and_then(|slot| slot.outputs.get(port))
            .map(|buf| &buf[..self.rendered])
    }

    pub fn kind(&self, node: NodeId) -> Option<ProcessorKind> {
        self.slots.get(node).map(|slot| slot.node.kind())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Absolute frame index of the next quantum.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Absolute audio-thread time of the next quantum, in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }
}

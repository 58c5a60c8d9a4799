//! Error types for the control side.
//!
//! Render-thread code never returns errors; it clamps or ignores bad input.
//! These cover the few control-thread operations that can genuinely fail.

use thiserror::Error;

use crate::engine::ProcessorKind;

/// Failure to hand a command to a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortError {
    /// The command queue has no free slot; the command was not sent
    #[error("command queue is full")]
    Full,
    /// The processor side of the port has been dropped
    #[error("processor has been torn down")]
    Disconnected,
}

/// Failure to instantiate a processor from a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("processor kind '{0}' is not registered with this context")]
    NotRegistered(ProcessorKind),
}

/// Failure to change render graph wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no node with id {0}")]
    UnknownNode(usize),
    #[error("node {node} has no output {port}")]
    NoSuchOutput { node: usize, port: usize },
    #[error("node {node} has no input {port}")]
    NoSuchInput { node: usize, port: usize },
    /// Connections must run from an earlier node to a later one
    #[error("connecting node {from} into node {to} would create a cycle")]
    Cycle { from: usize, to: usize },
    #[error("input {port} of node {node} is already connected")]
    InputOccupied { node: usize, port: usize },
}

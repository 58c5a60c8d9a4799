use std::collections::HashSet;

use crate::{
    config::EngineConfig,
    engine::{Node, Processor, ProcessorKind},
    error::RegistryError,
    io::Handle,
};

/// Processor kinds loaded into one audio context.
///
/// Built once per context and passed by reference to whatever creates
/// processors. Registering is idempotent; instantiating an unregistered kind
/// is an error rather than an implicit load.
#[derive(Debug, Clone)]
pub struct ProcessorRegistry {
    config: EngineConfig,
    loaded: HashSet<ProcessorKind>,
}

impl ProcessorRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            loaded: HashSet::new(),
        }
    }

    /// A registry with every processor kind loaded.
    pub fn with_all(config: EngineConfig) -> Self {
        let mut registry = Self::new(config);
        for kind in ProcessorKind::ALL {
            registry.register(kind);
        }
        registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a processor kind. Returns false if it was already loaded.
    pub fn register(&mut self, kind: ProcessorKind) -> bool {
        let added = self.loaded.insert(kind);
        if added {
            tracing::debug!(processor = %kind, "processor registered");
        }
        added
    }

    pub fn is_registered(&self, kind: ProcessorKind) -> bool {
        self.loaded.contains(&kind)
    }

    /// Build a processor for this context together with its control handle.
    pub fn instantiate<P: Processor>(&self) -> Result<(Node<P>, Handle<P>), RegistryError> {
        if !self.is_registered(P::KIND) {
            return Err(RegistryError::NotRegistered(P::KIND));
        }
        let processor = P::from_config(&self.config);
        Ok(Node::new(processor, self.config.effective_queue_capacity()))
    }
}

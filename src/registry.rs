//! Registry mapping node type names to constructors

use crate::kernel::NodeKernel;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Constructor for a node variant.
pub type KernelCreator = fn() -> Box<dyn NodeKernel>;

/// Factory mapping type names to node constructors.
///
/// Registries are plain values that can be constructed explicitly and passed
/// by reference; [`default_registry`] provides the process-wide instance
/// pre-populated with every builtin variant for convenience.
pub struct NodeRegistry {
    creators: BTreeMap<String, KernelCreator>,
}

impl NodeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            creators: BTreeMap::new(),
        }
    }

    /// Creates a registry with every builtin node variant registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::nodes::register_builtins(&mut registry);
        registry
    }

    /// Registers a constructor under a type name.
    ///
    /// Last registration wins: re-registering a name silently replaces the
    /// prior constructor.
    pub fn register(&mut self, name: impl Into<String>, creator: KernelCreator) {
        let name = name.into();
        if self.creators.insert(name.clone(), creator).is_some() {
            debug!("replaced node type registration '{}'", name);
        } else {
            debug!("registered node type '{}'", name);
        }
    }

    /// Creates a freshly constructed node of the named type.
    ///
    /// Returns `None` for unregistered names.
    pub fn create(&self, name: &str) -> Option<Box<dyn NodeKernel>> {
        self.creators.get(name).map(|creator| creator())
    }

    /// All registered type names.
    pub fn node_types(&self) -> Vec<String> {
        self.creators.keys().cloned().collect()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide default registry, populated once with all builtins.
pub fn default_registry() -> &'static NodeRegistry {
    static REGISTRY: Lazy<NodeRegistry> = Lazy::new(NodeRegistry::with_builtins);
    &REGISTRY
}

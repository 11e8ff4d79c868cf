//! Pixelgraph - a node-based image processing graph
//!
//! This library provides the core of an interactive image pipeline: a typed
//! node/port/connection data model, a registry of node constructors, and a
//! graph that owns its nodes, re-evaluating whenever a parameter or
//! connection changes. Editors and shells are external collaborators: they
//! mutate the graph through its API and observe [`GraphEvent`]s.

pub mod arena;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod nodes;
pub mod port;
pub mod registry;
pub mod value;

pub use arena::NodeHandle;
pub use error::GraphError;
pub use graph::{GraphEvent, NodeGraph, NodeId};
pub use kernel::{Inputs, NodeKernel};
pub use port::{DataKind, Port, PortDirection, PortId};
pub use registry::{default_registry, KernelCreator, NodeRegistry};
pub use value::{NodeValue, ParamValue, ParameterChange};

//! Graph operation errors

use crate::arena::NodeHandle;
use thiserror::Error;

/// Errors surfaced by graph operations.
///
/// Per the core error policy nothing here is fatal: data-availability and
/// boundary I/O failures are silent no-ops inside node processing, so the
/// only structured errors are addressing mistakes by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("handle {0:?} does not refer to a live node in this graph")]
    NodeNotFound(NodeHandle),
    #[error("input slot {port} is out of range for node {node:?}")]
    PortOutOfRange { node: NodeHandle, port: usize },
}

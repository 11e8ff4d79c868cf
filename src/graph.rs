//! Node graph ownership, mutation and evaluation
//!
//! The graph owns every node it contains. Connections are non-owning
//! back-references stored on the destination node's input slots, so removing
//! a node atomically severs every slot that points at it. Any mutation that
//! can change produced data (parameter change, connect, disconnect) triggers
//! a full evaluation pass.

use crate::arena::{NodeArena, NodeHandle};
use crate::error::GraphError;
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{input_ports, output_ports, Port};
use crate::value::{NodeValue, ParameterChange};
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;

/// Unique identifier for a node, assigned at insertion and never reused.
pub type NodeId = u64;

/// Notifications emitted by the graph for external collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeHandle),
    NodeRemoved(NodeHandle),
    ConnectionMade {
        source: NodeHandle,
        source_port: usize,
        dest: NodeHandle,
        dest_port: usize,
    },
    ConnectionRemoved {
        dest: NodeHandle,
        dest_port: usize,
    },
    /// A node produced fresh output data.
    NodeUpdated(NodeHandle),
    /// A full evaluation pass completed.
    GraphEvaluated,
}

/// Observer callback receiving graph events synchronously.
pub type GraphObserver = Box<dyn FnMut(&GraphEvent)>;

struct NodeEntry {
    id: NodeId,
    kernel: Box<dyn NodeKernel>,
    /// Back-reference per input port: source node and output slot index.
    inputs: Vec<Option<(NodeHandle, usize)>>,
    /// Produced value per output port, shared with downstream readers.
    outputs: Vec<Option<Arc<NodeValue>>>,
}

/// The owning collection of nodes and their connections.
pub struct NodeGraph {
    arena: NodeArena<NodeEntry>,
    /// Insertion order, which is also the evaluation order.
    order: Vec<NodeHandle>,
    next_id: NodeId,
    observers: Vec<GraphObserver>,
    pending: VecDeque<GraphEvent>,
    /// Guards against nested full passes while one is already running.
    evaluating: bool,
}

impl NodeGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            order: Vec::new(),
            next_id: 1,
            observers: Vec::new(),
            pending: VecDeque::new(),
            evaluating: false,
        }
    }

    /// Registers an observer that receives every subsequent event.
    pub fn add_observer(&mut self, observer: impl FnMut(&GraphEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Takes ownership of a node and appends it to the evaluation order.
    pub fn add_node(&mut self, kernel: Box<dyn NodeKernel>) -> NodeHandle {
        let ports = kernel.ports();
        let input_count = input_ports(&ports).count();
        let output_count = output_ports(&ports).count();
        let id = self.next_id;
        self.next_id += 1;

        debug!(
            "adding node {} '{}' ({} inputs, {} outputs)",
            id,
            kernel.type_name(),
            input_count,
            output_count
        );
        let handle = self.arena.insert(NodeEntry {
            id,
            kernel,
            inputs: vec![None; input_count],
            outputs: vec![None; output_count],
        });
        self.order.push(handle);
        self.emit(GraphEvent::NodeAdded(handle));
        handle
    }

    /// Removes a node, severing every connection that references it first.
    ///
    /// No-op if the handle is stale.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.arena.contains(handle) {
            return;
        }

        let mut severed = Vec::new();
        for other in self.order.clone() {
            if other == handle {
                continue;
            }
            let Some(entry) = self.arena.get_mut(other) else {
                continue;
            };
            for (port, slot) in entry.inputs.iter_mut().enumerate() {
                if matches!(slot, Some((source, _)) if *source == handle) {
                    *slot = None;
                    severed.push((other, port));
                }
            }
        }
        for (dest, dest_port) in severed {
            self.emit(GraphEvent::ConnectionRemoved { dest, dest_port });
        }

        self.order.retain(|h| *h != handle);
        if let Some(entry) = self.arena.remove(handle) {
            debug!("removed node {} '{}'", entry.id, entry.kernel.type_name());
        }
        self.emit(GraphEvent::NodeRemoved(handle));
    }

    /// Connects a source output slot to a destination input slot.
    ///
    /// The assignment is unconditional, silently replacing any prior source
    /// on that slot. Direction and data-kind compatibility are the caller's
    /// responsibility (see [`NodeGraph::can_connect`]); only addressing is
    /// checked here. Triggers a full evaluation pass.
    pub fn connect(
        &mut self,
        source: NodeHandle,
        source_port: usize,
        dest: NodeHandle,
        dest_port: usize,
    ) -> Result<(), GraphError> {
        if !self.arena.contains(source) {
            return Err(GraphError::NodeNotFound(source));
        }
        let entry = self
            .arena
            .get_mut(dest)
            .ok_or(GraphError::NodeNotFound(dest))?;
        let slot = entry
            .inputs
            .get_mut(dest_port)
            .ok_or(GraphError::PortOutOfRange {
                node: dest,
                port: dest_port,
            })?;
        *slot = Some((source, source_port));
        self.emit(GraphEvent::ConnectionMade {
            source,
            source_port,
            dest,
            dest_port,
        });
        self.evaluate();
        Ok(())
    }

    /// Clears a destination input slot. Triggers a full evaluation pass.
    pub fn disconnect(&mut self, dest: NodeHandle, dest_port: usize) -> Result<(), GraphError> {
        let entry = self
            .arena
            .get_mut(dest)
            .ok_or(GraphError::NodeNotFound(dest))?;
        let slot = entry
            .inputs
            .get_mut(dest_port)
            .ok_or(GraphError::PortOutOfRange {
                node: dest,
                port: dest_port,
            })?;
        *slot = None;
        self.emit(GraphEvent::ConnectionRemoved { dest, dest_port });
        self.evaluate();
        Ok(())
    }

    /// Whether an output-to-input pairing is direction- and kind-compatible.
    ///
    /// This is the predicate an editor is expected to check before calling
    /// [`NodeGraph::connect`]. Port indices are per-direction ordinals.
    pub fn can_connect(
        &self,
        source: NodeHandle,
        source_port: usize,
        dest: NodeHandle,
        dest_port: usize,
    ) -> bool {
        let (Some(from), Some(to)) = (self.arena.get(source), self.arena.get(dest)) else {
            return false;
        };
        let from_ports = from.kernel.ports();
        let to_ports = to.kernel.ports();
        let out = output_ports(&from_ports).nth(source_port);
        let inp = input_ports(&to_ports).nth(dest_port);
        match (out, inp) {
            (Some(out), Some(inp)) => out.kind.can_connect_to(&inp.kind),
            _ => false,
        }
    }

    /// Applies a parameter change and eagerly reprocesses the node.
    ///
    /// An accepted change that produces fresh output cascades into a full
    /// evaluation pass, matching the "setter synchronously re-processes"
    /// contract. Rejected changes are silent no-ops.
    pub fn set_parameter(
        &mut self,
        handle: NodeHandle,
        change: ParameterChange,
    ) -> Result<(), GraphError> {
        let entry = self
            .arena
            .get_mut(handle)
            .ok_or(GraphError::NodeNotFound(handle))?;
        if !entry.kernel.set_parameter(&change) {
            debug!(
                "node {} rejected parameter '{}'",
                entry.id, change.parameter
            );
            return Ok(());
        }
        if self.process_node(handle) {
            self.emit(GraphEvent::NodeUpdated(handle));
            self.evaluate();
        }
        Ok(())
    }

    /// Processes every node in insertion order, once.
    ///
    /// Evaluation is deliberately not topologically sorted: each node pulls
    /// its upstream outputs on demand, so a node processed before its
    /// producer refreshed this pass reads the previous value and converges on
    /// the next triggered pass. A pass already in progress suppresses nested
    /// passes, which bounds the cascade caused by nodes signalling updates
    /// mid-pass (cycles are representable and never loop).
    pub fn evaluate(&mut self) {
        if self.evaluating {
            debug!("evaluation pass already running, nested pass suppressed");
            return;
        }
        self.evaluating = true;
        for handle in self.order.clone() {
            if self.process_node(handle) {
                self.emit(GraphEvent::NodeUpdated(handle));
            }
        }
        self.evaluating = false;
        self.emit(GraphEvent::GraphEvaluated);
    }

    /// Handles of all contained nodes in insertion order.
    pub fn nodes(&self) -> Vec<NodeHandle> {
        self.order.clone()
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.arena.contains(handle)
    }

    /// The stable numeric id of a node.
    pub fn node_id(&self, handle: NodeHandle) -> Option<NodeId> {
        self.arena.get(handle).map(|entry| entry.id)
    }

    /// The variant type name of a node.
    pub fn type_name(&self, handle: NodeHandle) -> Option<&'static str> {
        self.arena.get(handle).map(|entry| entry.kernel.type_name())
    }

    /// The current port list of a node.
    pub fn ports(&self, handle: NodeHandle) -> Option<Vec<Port>> {
        self.arena.get(handle).map(|entry| entry.kernel.ports())
    }

    /// The back-reference currently stored on an input slot.
    pub fn input_source(&self, handle: NodeHandle, port: usize) -> Option<(NodeHandle, usize)> {
        self.arena.get(handle)?.inputs.get(port).copied().flatten()
    }

    /// The value currently held on an output slot.
    pub fn output_value(&self, handle: NodeHandle, port: usize) -> Option<Arc<NodeValue>> {
        self.arena.get(handle)?.outputs.get(port).cloned().flatten()
    }

    /// Downcast access to a node's concrete kernel.
    pub fn kernel<K: NodeKernel>(&self, handle: NodeHandle) -> Option<&K> {
        self.arena.get(handle)?.kernel.as_any().downcast_ref()
    }

    /// Mutable downcast access to a node's concrete kernel.
    ///
    /// Direct mutation bypasses the reprocess-on-change contract; prefer
    /// [`NodeGraph::set_parameter`] for anything that affects produced data.
    pub fn kernel_mut<K: NodeKernel>(&mut self, handle: NodeHandle) -> Option<&mut K> {
        self.arena
            .get_mut(handle)?
            .kernel
            .as_any_mut()
            .downcast_mut()
    }

    /// Resolves a node's input slots and runs its kernel.
    ///
    /// Returns whether the node produced fresh output.
    fn process_node(&mut self, handle: NodeHandle) -> bool {
        let inputs = self.resolve_inputs(handle);
        let Some(entry) = self.arena.get_mut(handle) else {
            return false;
        };
        match entry.kernel.process(&inputs) {
            Some(values) => {
                // A batch that does not cover every slot is discarded whole;
                // slots must never be left half-updated.
                if values.len() != entry.outputs.len() {
                    warn!(
                        "node {} produced {} outputs, expected {}, batch dropped",
                        entry.id,
                        values.len(),
                        entry.outputs.len()
                    );
                    return false;
                }
                for (slot, value) in entry.outputs.iter_mut().zip(values) {
                    *slot = Some(Arc::new(value));
                }
                true
            }
            None => false,
        }
    }

    /// Follows each input slot's back-reference to the source's output slot.
    fn resolve_inputs(&self, handle: NodeHandle) -> Inputs {
        let Some(entry) = self.arena.get(handle) else {
            return Inputs::empty();
        };
        let values = entry
            .inputs
            .iter()
            .map(|slot| {
                slot.and_then(|(source, port)| {
                    self.arena
                        .get(source)
                        .and_then(|src| src.outputs.get(port).cloned().flatten())
                })
            })
            .collect();
        Inputs::new(values)
    }

    fn emit(&mut self, event: GraphEvent) {
        self.pending.push_back(event);
        while let Some(event) = self.pending.pop_front() {
            for observer in self.observers.iter_mut() {
                observer(&event);
            }
        }
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{DataKind, Port};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Produces a fixed integer; counts how often it was processed.
    struct SourceKernel {
        value: i32,
        processed: usize,
    }

    impl SourceKernel {
        fn new(value: i32) -> Self {
            Self {
                value,
                processed: 0,
            }
        }
    }

    impl NodeKernel for SourceKernel {
        fn type_name(&self) -> &'static str {
            "Test Source"
        }

        fn ports(&self) -> Vec<Port> {
            vec![Port::output(0, "Output", DataKind::Integer)]
        }

        fn process(&mut self, _inputs: &Inputs) -> Option<Vec<NodeValue>> {
            self.processed += 1;
            Some(vec![NodeValue::Integer(self.value)])
        }

        fn set_parameter(&mut self, change: &ParameterChange) -> bool {
            match (change.parameter.as_str(), &change.value) {
                ("value", crate::value::ParamValue::Integer(v)) => {
                    self.value = *v;
                    true
                }
                _ => false,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Adds one to its integer input; no-op without input.
    struct IncrementKernel;

    impl NodeKernel for IncrementKernel {
        fn type_name(&self) -> &'static str {
            "Test Increment"
        }

        fn ports(&self) -> Vec<Port> {
            vec![
                Port::input(0, "Input", DataKind::Integer),
                Port::output(1, "Output", DataKind::Integer),
            ]
        }

        fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
            match inputs.get(0) {
                Some(NodeValue::Integer(v)) => Some(vec![NodeValue::Integer(v + 1)]),
                _ => None,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn int_output(graph: &NodeGraph, handle: NodeHandle) -> Option<i32> {
        match graph.output_value(handle, 0).as_deref() {
            Some(NodeValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    #[test]
    fn test_remove_node_severs_connections() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let a = graph.add_node(Box::new(IncrementKernel));
        let b = graph.add_node(Box::new(IncrementKernel));
        graph.connect(source, 0, a, 0).unwrap();
        graph.connect(source, 0, b, 0).unwrap();

        graph.remove_node(source);
        assert!(!graph.contains(source));
        for handle in graph.nodes() {
            assert!(graph.input_source(handle, 0).is_none());
        }
        // Removing again is a no-op.
        graph.remove_node(source);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_connect_disconnect_restores_slot() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(41)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        graph.evaluate();
        // No input yet: the increment node never produced.
        assert_eq!(int_output(&graph, inc), None);

        graph.connect(source, 0, inc, 0).unwrap();
        assert_eq!(graph.input_source(inc, 0), Some((source, 0)));
        assert_eq!(int_output(&graph, inc), Some(42));

        graph.disconnect(inc, 0).unwrap();
        assert_eq!(graph.input_source(inc, 0), None);
        // Output keeps its last good value after disconnection.
        graph.evaluate();
        assert_eq!(int_output(&graph, inc), Some(42));
    }

    #[test]
    fn test_unproductive_connection_leaves_output_empty() {
        let mut graph = NodeGraph::new();
        // An increment node with nothing upstream never produces.
        let idle = graph.add_node(Box::new(IncrementKernel));
        let inc = graph.add_node(Box::new(IncrementKernel));
        graph.connect(idle, 0, inc, 0).unwrap();
        graph.disconnect(inc, 0).unwrap();
        graph.evaluate();
        assert_eq!(int_output(&graph, inc), None);
    }

    #[test]
    fn test_connection_replaces_prior_source() {
        let mut graph = NodeGraph::new();
        let first = graph.add_node(Box::new(SourceKernel::new(1)));
        let second = graph.add_node(Box::new(SourceKernel::new(10)));
        let inc = graph.add_node(Box::new(IncrementKernel));

        graph.connect(first, 0, inc, 0).unwrap();
        graph.connect(second, 0, inc, 0).unwrap();
        assert_eq!(graph.input_source(inc, 0), Some((second, 0)));
        assert_eq!(int_output(&graph, inc), Some(11));
    }

    #[test]
    fn test_evaluate_is_fixed_point() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(5)));
        let a = graph.add_node(Box::new(IncrementKernel));
        let b = graph.add_node(Box::new(IncrementKernel));
        graph.connect(source, 0, a, 0).unwrap();
        graph.connect(a, 0, b, 0).unwrap();

        graph.evaluate();
        let after_first = int_output(&graph, b);
        graph.evaluate();
        assert_eq!(int_output(&graph, b), after_first);
        assert_eq!(after_first, Some(7));
    }

    #[test]
    fn test_set_parameter_cascades() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        graph.connect(source, 0, inc, 0).unwrap();
        assert_eq!(int_output(&graph, inc), Some(2));

        graph
            .set_parameter(source, ParameterChange::integer("value", 99))
            .unwrap();
        assert_eq!(int_output(&graph, inc), Some(100));

        // Rejected parameter: nothing reprocessed.
        let before = graph.kernel::<SourceKernel>(source).unwrap().processed;
        graph
            .set_parameter(source, ParameterChange::float("value", 1.0))
            .unwrap();
        assert_eq!(
            graph.kernel::<SourceKernel>(source).unwrap().processed,
            before
        );
    }

    #[test]
    fn test_stale_handle_errors() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        graph.remove_node(source);

        assert_eq!(
            graph.connect(source, 0, inc, 0),
            Err(GraphError::NodeNotFound(source))
        );
        assert_eq!(
            graph.set_parameter(source, ParameterChange::integer("value", 0)),
            Err(GraphError::NodeNotFound(source))
        );
        assert!(!graph.can_connect(source, 0, inc, 0));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        assert_eq!(
            graph.connect(source, 0, inc, 3),
            Err(GraphError::PortOutOfRange { node: inc, port: 3 })
        );
        assert_eq!(
            graph.disconnect(inc, 3),
            Err(GraphError::PortOutOfRange { node: inc, port: 3 })
        );
    }

    #[test]
    fn test_can_connect_checks_kinds_and_ordinals() {
        let mut graph = NodeGraph::new();
        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        assert!(graph.can_connect(source, 0, inc, 0));
        assert!(!graph.can_connect(source, 1, inc, 0));
        assert!(!graph.can_connect(source, 0, inc, 1));
        // Out-of-range output ordinal on the source side.
        assert!(!graph.can_connect(inc, 1, inc, 0));
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(Box::new(IncrementKernel));
        let b = graph.add_node(Box::new(IncrementKernel));
        let source = graph.add_node(Box::new(SourceKernel::new(0)));
        graph.connect(source, 0, a, 0).unwrap();
        graph.connect(a, 0, b, 0).unwrap();
        // Cycle: b feeds back into a, replacing the source.
        graph.connect(b, 0, a, 0).unwrap();
        // A bounded pass per trigger; never loops.
        graph.evaluate();
        graph.evaluate();
    }

    #[test]
    fn test_events_are_emitted_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let mut graph = NodeGraph::new();
        graph.add_observer(move |event| sink.borrow_mut().push(event.clone()));

        let source = graph.add_node(Box::new(SourceKernel::new(1)));
        let inc = graph.add_node(Box::new(IncrementKernel));
        graph.connect(source, 0, inc, 0).unwrap();
        graph.remove_node(source);

        let log = events.borrow();
        assert_eq!(log[0], GraphEvent::NodeAdded(source));
        assert_eq!(log[1], GraphEvent::NodeAdded(inc));
        assert_eq!(
            log[2],
            GraphEvent::ConnectionMade {
                source,
                source_port: 0,
                dest: inc,
                dest_port: 0
            }
        );
        assert!(log.contains(&GraphEvent::GraphEvaluated));
        assert!(log.contains(&GraphEvent::ConnectionRemoved {
            dest: inc,
            dest_port: 0
        }));
        assert_eq!(*log.last().unwrap(), GraphEvent::NodeRemoved(source));
    }

    /// Declares two outputs but only ever produces one value.
    struct ShortBatchKernel;

    impl NodeKernel for ShortBatchKernel {
        fn type_name(&self) -> &'static str {
            "Test Short Batch"
        }

        fn ports(&self) -> Vec<Port> {
            vec![
                Port::output(0, "First", DataKind::Integer),
                Port::output(1, "Second", DataKind::Integer),
            ]
        }

        fn process(&mut self, _inputs: &Inputs) -> Option<Vec<NodeValue>> {
            Some(vec![NodeValue::Integer(7)])
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_incomplete_output_batch_is_dropped() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let mut graph = NodeGraph::new();
        graph.add_observer(move |event| sink.borrow_mut().push(event.clone()));

        let node = graph.add_node(Box::new(ShortBatchKernel));
        graph.evaluate();
        // Neither slot may be written, not even the produced prefix.
        assert!(graph.output_value(node, 0).is_none());
        assert!(graph.output_value(node, 1).is_none());
        assert!(!events.borrow().contains(&GraphEvent::NodeUpdated(node)));
    }

    #[test]
    fn test_node_ids_are_never_reused() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(Box::new(SourceKernel::new(1)));
        let first_id = graph.node_id(a).unwrap();
        graph.remove_node(a);
        let b = graph.add_node(Box::new(SourceKernel::new(2)));
        assert_ne!(graph.node_id(b).unwrap(), first_id);
    }
}

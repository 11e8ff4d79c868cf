//! The processing contract every node variant implements

use crate::port::Port;
use crate::value::{NodeValue, ParameterChange};
use image::DynamicImage;
use std::any::Any;
use std::sync::Arc;

/// Resolved view of a node's input slots at processing time.
///
/// The graph builds this by following each input slot's back-reference to the
/// source node's output slot just before calling [`NodeKernel::process`], so
/// a node always reads whatever its upstream producers hold at that moment.
pub struct Inputs {
    values: Vec<Option<Arc<NodeValue>>>,
}

impl Inputs {
    /// A view with no connected inputs.
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Builds a view from resolved slot values, one entry per input port.
    pub fn new(values: Vec<Option<Arc<NodeValue>>>) -> Self {
        Self { values }
    }

    /// The value on an input slot, if connected and produced.
    pub fn get(&self, slot: usize) -> Option<&NodeValue> {
        self.values.get(slot)?.as_deref()
    }

    /// The image on an input slot.
    ///
    /// Zero-sized images count as absent: a connected but semantically empty
    /// input must behave exactly like a missing one.
    pub fn image(&self, slot: usize) -> Option<&DynamicImage> {
        let image = self.get(slot)?.as_image()?;
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(image)
    }
}

/// A node variant's processing behavior.
///
/// Implementations are registered in a [`NodeRegistry`](crate::NodeRegistry)
/// and stored by a [`NodeGraph`](crate::NodeGraph), which owns the instance
/// for its whole lifetime.
pub trait NodeKernel: Any {
    /// Registry key and display name of this variant.
    fn type_name(&self) -> &'static str;

    /// Full port list, stable while the configuration is unchanged.
    fn ports(&self) -> Vec<Port>;

    /// Computes this node's outputs from its resolved inputs.
    ///
    /// Returns one value per output port on success, which also signals
    /// "data updated" to the owning graph. Returns `None` when a required
    /// input is absent or empty: the silent no-op, leaving output slots at
    /// their last produced values.
    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>>;

    /// Applies a named parameter mutation.
    ///
    /// Returns whether the change was accepted. Rejected changes (unknown
    /// parameter, wrong payload type, out-of-range kernel size or cell) leave
    /// the node untouched and suppress reprocessing.
    fn set_parameter(&mut self, _change: &ParameterChange) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//! Generational arena storage for graph nodes
//!
//! Nodes are addressed by [`NodeHandle`], an index paired with a generation
//! counter. Removing a node bumps the slot's generation, so a handle kept
//! around after removal resolves to `None` instead of aliasing whatever node
//! gets stored in the recycled slot later.

use serde::{Deserialize, Serialize};

/// Handle to a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Raw slot index, primarily useful for logging.
    pub fn index(&self) -> u32 {
        self.index
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot-recycling arena with generation-checked handles.
pub struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a value and returns a handle to it.
    pub fn insert(&mut self, value: T) -> NodeHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                NodeHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                NodeHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Removes and returns the value for a handle. Stale handles yield `None`.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.value.is_none() {
            return None;
        }
        let value = slot.value.take();
        // The slot is only reusable once the generation no longer matches
        // outstanding handles.
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        value
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Whether the handle refers to a live value.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

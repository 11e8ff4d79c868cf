//! Port types and functionality for node connections

use serde::{Deserialize, Serialize};

/// Index of a port within a node's port list.
pub type PortId = usize;

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// Kinds of data that can flow through ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// Raster image data
    Image,
    /// Floating point number
    Scalar,
    /// Boolean value
    Boolean,
    /// Integer value
    Integer,
}

impl DataKind {
    /// Check if this data kind can connect to another.
    pub fn can_connect_to(&self, other: &DataKind) -> bool {
        self == other
    }

    /// Get a human-readable name for this data kind.
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Image => "Image",
            DataKind::Scalar => "Scalar",
            DataKind::Boolean => "Boolean",
            DataKind::Integer => "Integer",
        }
    }
}

/// A named, directioned, typed data slot on a node.
///
/// Port lists are produced on demand by the node and are value-stable across
/// repeated calls while the node's configuration is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    pub kind: DataKind,
}

impl Port {
    /// Creates a new input port.
    pub fn input(id: PortId, name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            id,
            name: name.into(),
            direction: PortDirection::Input,
            kind,
        }
    }

    /// Creates a new output port.
    pub fn output(id: PortId, name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            id,
            name: name.into(),
            direction: PortDirection::Output,
            kind,
        }
    }

    /// Checks if this port is an input.
    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortDirection::Input)
    }

    /// Checks if this port is an output.
    pub fn is_output(&self) -> bool {
        matches!(self.direction, PortDirection::Output)
    }
}

/// Input ports of a port list, in declaration order.
pub fn input_ports(ports: &[Port]) -> impl Iterator<Item = &Port> {
    ports.iter().filter(|p| p.is_input())
}

/// Output ports of a port list, in declaration order.
pub fn output_ports(ports: &[Port]) -> impl Iterator<Item = &Port> {
    ports.iter().filter(|p| p.is_output())
}

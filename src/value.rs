//! Values that flow between nodes and parameter change payloads

use crate::port::DataKind;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A value produced on an output port.
///
/// Output values are owned by the node that produced them; downstream nodes
/// read them through shared references resolved at evaluation time rather
/// than copies stored on the connection.
#[derive(Debug, Clone)]
pub enum NodeValue {
    Image(DynamicImage),
    Scalar(f32),
    Integer(i32),
    Boolean(bool),
}

impl NodeValue {
    /// The data kind this value matches on a port.
    pub fn kind(&self) -> DataKind {
        match self {
            NodeValue::Image(_) => DataKind::Image,
            NodeValue::Scalar(_) => DataKind::Scalar,
            NodeValue::Integer(_) => DataKind::Integer,
            NodeValue::Boolean(_) => DataKind::Boolean,
        }
    }

    pub fn as_image(&self) -> Option<&DynamicImage> {
        match self {
            NodeValue::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Payload of a single parameter mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Integer(i32),
    Boolean(bool),
    Text(String),
    /// One cell of a convolution kernel.
    KernelCell { row: usize, col: usize, value: f32 },
}

/// A named parameter mutation routed to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    pub parameter: String,
    pub value: ParamValue,
}

impl ParameterChange {
    pub fn new(parameter: impl Into<String>, value: ParamValue) -> Self {
        Self {
            parameter: parameter.into(),
            value,
        }
    }

    pub fn float(parameter: impl Into<String>, value: f32) -> Self {
        Self::new(parameter, ParamValue::Float(value))
    }

    pub fn integer(parameter: impl Into<String>, value: i32) -> Self {
        Self::new(parameter, ParamValue::Integer(value))
    }

    pub fn boolean(parameter: impl Into<String>, value: bool) -> Self {
        Self::new(parameter, ParamValue::Boolean(value))
    }

    pub fn text(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(parameter, ParamValue::Text(value.into()))
    }

    pub fn kernel_cell(row: usize, col: usize, value: f32) -> Self {
        Self::new("kernel", ParamValue::KernelCell { row, col, value })
    }
}

//! Boundary I/O nodes: image file input and output
//!
//! These two variants own the only file-system touchpoints of the core. I/O
//! failures are absorbed here and surface only as "image stays empty"; no
//! structured error propagates into the graph.

use super::common::is_empty;
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::DynamicImage;
use log::warn;
use std::any::Any;

/// Loads an image from a configured path.
pub struct ImageInputNode {
    path: String,
    image: Option<DynamicImage>,
}

impl ImageInputNode {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            image: None,
        }
    }

    /// The most recently loaded image.
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }
}

impl Default for ImageInputNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for ImageInputNode {
    fn type_name(&self) -> &'static str {
        "Image Input"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::output(0, "Output", DataKind::Image)]
    }

    fn process(&mut self, _inputs: &Inputs) -> Option<Vec<NodeValue>> {
        if self.path.is_empty() {
            return None;
        }
        let image = match image::open(&self.path) {
            Ok(image) => DynamicImage::ImageRgb8(image.to_rgb8()),
            Err(err) => {
                warn!("failed to load image '{}': {}", self.path, err);
                return None;
            }
        };
        if is_empty(&image) {
            return None;
        }
        self.image = Some(image.clone());
        Some(vec![NodeValue::Image(image)])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("path", ParamValue::Text(path)) => {
                self.path = path.clone();
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

/// Copies its input into a result buffer and optionally writes it to disk.
///
/// The output format is inferred from the configured path's extension.
pub struct ImageOutputNode {
    path: String,
    result: Option<DynamicImage>,
}

impl ImageOutputNode {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            result: None,
        }
    }

    /// The last copied result buffer.
    pub fn result(&self) -> Option<&DynamicImage> {
        self.result.as_ref()
    }
}

impl Default for ImageOutputNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for ImageOutputNode {
    fn type_name(&self) -> &'static str {
        "Image Output"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::input(0, "Input", DataKind::Image)]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        self.result = Some(input.clone());
        if !self.path.is_empty() {
            if let Err(err) = input.save(&self.path) {
                warn!("failed to write image '{}': {}", self.path, err);
            }
        }
        Some(Vec::new())
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("path", ParamValue::Text(path)) => {
                self.path = path.clone();
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

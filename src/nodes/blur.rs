//! Gaussian blur node

use super::common::gaussian_blur;
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use std::any::Any;

/// Gaussian smoothing with a configurable odd kernel side length.
pub struct BlurNode {
    radius: usize,
}

impl BlurNode {
    pub fn new() -> Self {
        Self { radius: 5 }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }
}

impl Default for BlurNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for BlurNode {
    fn type_name(&self) -> &'static str {
        "Blur"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        Some(vec![NodeValue::Image(gaussian_blur(input, self.radius))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            // The kernel side length must stay odd and positive.
            ("radius", ParamValue::Integer(v)) if *v > 0 && *v % 2 == 1 => {
                self.radius = *v as usize;
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

//! Brightness/contrast adjustment node

use super::common::{clamp_u8, merge_planes, split_planes};
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use std::any::Any;

/// Applies `output = input * contrast + brightness` per channel, saturating.
pub struct BrightnessContrastNode {
    brightness: i32,
    contrast: f32,
}

impl BrightnessContrastNode {
    pub fn new() -> Self {
        Self {
            brightness: 0,
            contrast: 1.0,
        }
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }
}

impl Default for BrightnessContrastNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for BrightnessContrastNode {
    fn type_name(&self) -> &'static str {
        "Brightness/Contrast"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        let mut planes = split_planes(input);
        for plane in planes.data.iter_mut() {
            for v in plane.iter_mut() {
                *v = clamp_u8(*v as f32 * self.contrast + self.brightness as f32);
            }
        }
        Some(vec![NodeValue::Image(merge_planes(&planes))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("brightness", ParamValue::Integer(v)) => {
                self.brightness = *v;
                true
            }
            ("contrast", ParamValue::Float(v)) => {
                self.contrast = *v;
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

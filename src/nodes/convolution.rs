//! User-editable convolution filter node

use super::common::{correlate, merge_planes, split_planes};
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use std::any::Any;

/// Named kernel presets available at both supported sizes.
pub const PRESET_SHARPEN: i32 = 1;
pub const PRESET_EDGE: i32 = 2;
pub const PRESET_EMBOSS: i32 = 3;
pub const PRESET_BOX_BLUR: i32 = 4;

/// Applies a square kernel by correlation with boundary replication.
///
/// Kernel sizes are restricted to 3 and 5; edits outside that range and cell
/// writes outside the current bounds are ignored. The default kernel is the
/// identity.
pub struct ConvolutionFilterNode {
    size: usize,
    kernel: Vec<f32>,
}

impl ConvolutionFilterNode {
    pub fn new() -> Self {
        let mut node = Self {
            size: 3,
            kernel: Vec::new(),
        };
        node.reset_identity();
        node
    }

    pub fn kernel_size(&self) -> usize {
        self.size
    }

    pub fn kernel_value(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.size && col < self.size {
            Some(self.kernel[row * self.size + col])
        } else {
            None
        }
    }

    fn reset_identity(&mut self) {
        self.kernel = vec![0.0; self.size * self.size];
        let center = self.size / 2;
        self.kernel[center * self.size + center] = 1.0;
    }

    fn apply_preset(&mut self, preset: i32) {
        self.reset_identity();
        match (preset, self.size) {
            (PRESET_SHARPEN, 3) => {
                self.kernel = vec![
                    0.0, -1.0, 0.0, //
                    -1.0, 5.0, -1.0, //
                    0.0, -1.0, 0.0,
                ];
            }
            (PRESET_SHARPEN, _) => {
                self.kernel = vec![
                    0.0, 0.0, -1.0, 0.0, 0.0, //
                    0.0, -1.0, -1.0, -1.0, 0.0, //
                    -1.0, -1.0, 25.0, -1.0, -1.0, //
                    0.0, -1.0, -1.0, -1.0, 0.0, //
                    0.0, 0.0, -1.0, 0.0, 0.0,
                ];
            }
            (PRESET_EDGE, 3) => {
                self.kernel = vec![
                    -1.0, -1.0, -1.0, //
                    -1.0, 8.0, -1.0, //
                    -1.0, -1.0, -1.0,
                ];
            }
            (PRESET_EDGE, _) => {
                self.kernel = vec![-1.0; 25];
                self.kernel[12] = 24.0;
            }
            (PRESET_EMBOSS, 3) => {
                self.kernel = vec![
                    -2.0, -1.0, 0.0, //
                    -1.0, 1.0, 1.0, //
                    0.0, 1.0, 2.0,
                ];
            }
            (PRESET_EMBOSS, _) => {
                self.kernel = vec![
                    -2.0, -2.0, -1.0, 0.0, 0.0, //
                    -2.0, -1.0, 0.0, 1.0, 0.0, //
                    -1.0, 0.0, 1.0, 2.0, 1.0, //
                    0.0, 1.0, 2.0, 1.0, 0.0, //
                    0.0, 0.0, 1.0, 0.0, 0.0,
                ];
            }
            (PRESET_BOX_BLUR, _) => {
                let v = 1.0 / (self.size * self.size) as f32;
                self.kernel = vec![v; self.size * self.size];
            }
            // Unknown presets leave the identity kernel in place.
            _ => {}
        }
    }
}

impl Default for ConvolutionFilterNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for ConvolutionFilterNode {
    fn type_name(&self) -> &'static str {
        "Convolution Filter"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        let planes = split_planes(input);
        let filtered = correlate(&planes, &self.kernel, self.size);
        Some(vec![NodeValue::Image(merge_planes(&filtered))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            // Only odd sizes 3 and 5 are supported; switching resets to identity.
            ("size", ParamValue::Integer(v)) if *v == 3 || *v == 5 => {
                self.size = *v as usize;
                self.reset_identity();
                true
            }
            ("size", _) => false,
            ("preset", ParamValue::Integer(v)) => {
                self.apply_preset(*v);
                true
            }
            ("kernel", ParamValue::KernelCell { row, col, value }) => {
                if *row < self.size && *col < self.size {
                    self.kernel[row * self.size + col] = *value;
                    true
                } else {
                    false
                }
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

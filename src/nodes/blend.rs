//! Two-image blend node

use super::common::clamp_u8;
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use std::any::Any;

/// Combines two images with a configurable mode and opacity.
///
/// The second image is resized to the first if dimensions differ. Modes are
/// selected by integer: 0 Normal, 1 Multiply, 2 Screen, 3 Overlay,
/// 4 Difference; any other value passes the first image through unchanged.
pub struct BlendNode {
    mode: i32,
    opacity: f32,
}

impl BlendNode {
    pub fn new() -> Self {
        Self {
            mode: 0,
            opacity: 0.5,
        }
    }

    pub fn mode(&self) -> i32 {
        self.mode
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    fn combine(&self, a: &RgbImage, b: &RgbImage) -> RgbImage {
        let op = self.opacity;
        let mut out = RgbImage::new(a.width(), a.height());
        for ((pa, pb), po) in a.pixels().zip(b.pixels()).zip(out.pixels_mut()) {
            for c in 0..3 {
                let x = pa.0[c] as f32;
                let y = pb.0[c] as f32;
                po.0[c] = match self.mode {
                    0 => clamp_u8(x * (1.0 - op) + y * op),
                    1 => clamp_u8(x * y / 255.0),
                    2 => clamp_u8(255.0 - (255.0 - x) * (255.0 - y) / 255.0),
                    3 => {
                        let a01 = x / 255.0;
                        let b01 = y / 255.0;
                        let r = if a01 < 0.5 {
                            2.0 * a01 * b01
                        } else {
                            1.0 - 2.0 * (1.0 - a01) * (1.0 - b01)
                        };
                        clamp_u8(((1.0 - op) * a01 + op * r) * 255.0)
                    }
                    4 => (x - y).abs() as u8,
                    _ => pa.0[c],
                };
            }
        }
        out
    }
}

impl Default for BlendNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for BlendNode {
    fn type_name(&self) -> &'static str {
        "Blend"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input 1", DataKind::Image),
            Port::input(1, "Input 2", DataKind::Image),
            Port::output(2, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let first = inputs.image(0)?;
        let second = inputs.image(1)?;
        let a = first.to_rgb8();
        let b = if second.width() == first.width() && second.height() == first.height() {
            second.to_rgb8()
        } else {
            imageops::resize(
                &second.to_rgb8(),
                first.width(),
                first.height(),
                FilterType::Triangle,
            )
        };
        let blended = self.combine(&a, &b);
        Some(vec![NodeValue::Image(DynamicImage::ImageRgb8(blended))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("mode", ParamValue::Integer(v)) => {
                self.mode = *v;
                true
            }
            ("opacity", ParamValue::Float(v)) => {
                self.opacity = *v;
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

//! Binary threshold node

use super::common::to_gray;
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::DynamicImage;
use std::any::Any;

/// Converts to grayscale and binarizes at a configurable cutoff.
///
/// The comparison is exclusive: a pixel exactly at the threshold maps to the
/// "below" output.
pub struct ThresholdNode {
    threshold: i32,
}

impl ThresholdNode {
    pub fn new() -> Self {
        Self { threshold: 127 }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }
}

impl Default for ThresholdNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for ThresholdNode {
    fn type_name(&self) -> &'static str {
        "Threshold"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        let mut gray = to_gray(input);
        for pixel in gray.pixels_mut() {
            pixel.0[0] = if (pixel.0[0] as i32) > self.threshold {
                255
            } else {
                0
            };
        }
        Some(vec![NodeValue::Image(DynamicImage::ImageLuma8(gray))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("threshold", ParamValue::Integer(v)) => {
                self.threshold = *v;
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

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::sync::Arc;

    fn gray_input(value: u8) -> Inputs {
        let image = GrayImage::from_pixel(1, 1, Luma([value]));
        Inputs::new(vec![Some(Arc::new(NodeValue::Image(
            DynamicImage::ImageLuma8(image),
        )))])
    }

    fn single_pixel(outputs: &[NodeValue]) -> u8 {
        let NodeValue::Image(result) = &outputs[0] else {
            panic!("expected image output");
        };
        result.to_luma8().get_pixel(0, 0).0[0]
    }

    #[test]
    fn test_exclusive_boundary() {
        let mut node = ThresholdNode::new();
        // 127 at threshold 127 is "below"; 128 is "above".
        assert_eq!(single_pixel(&node.process(&gray_input(127)).unwrap()), 0);
        assert_eq!(single_pixel(&node.process(&gray_input(128)).unwrap()), 255);
    }

    #[test]
    fn test_multi_channel_input_is_grayscaled() {
        let image = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let mut node = ThresholdNode::new();
        let outputs = node
            .process(&Inputs::new(vec![Some(Arc::new(NodeValue::Image(
                DynamicImage::ImageRgb8(image),
            )))]))
            .unwrap();
        let NodeValue::Image(result) = &outputs[0] else {
            panic!("expected image output");
        };
        assert!(matches!(result, DynamicImage::ImageLuma8(_)));
        assert!(result.to_luma8().pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_threshold_parameter() {
        let mut node = ThresholdNode::new();
        assert!(node.set_parameter(&ParameterChange::integer("threshold", 10)));
        assert_eq!(single_pixel(&node.process(&gray_input(11)).unwrap()), 255);
        assert!(!node.set_parameter(&ParameterChange::float("threshold", 10.0)));
    }
}

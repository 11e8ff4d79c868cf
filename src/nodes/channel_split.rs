//! Color channel splitter node

use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::{DynamicImage, GrayImage, RgbImage};
use std::any::Any;

/// Splits an image into R, G, B and A outputs.
///
/// Single-channel inputs are duplicated into all three color channels; a
/// missing alpha channel defaults to fully opaque. Channels are emitted
/// either as grayscale images or as full-color images with the other
/// channels zeroed.
pub struct ChannelSplitterNode {
    grayscale: bool,
}

impl ChannelSplitterNode {
    pub fn new() -> Self {
        Self { grayscale: true }
    }

    pub fn output_grayscale(&self) -> bool {
        self.grayscale
    }
}

impl Default for ChannelSplitterNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for ChannelSplitterNode {
    fn type_name(&self) -> &'static str {
        "Channel Splitter"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Red", DataKind::Image),
            Port::output(2, "Green", DataKind::Image),
            Port::output(3, "Blue", DataKind::Image),
            Port::output(4, "Alpha", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        let (width, height) = (input.width(), input.height());
        let rgba = input.to_rgba8();
        let had_alpha = input.color().has_alpha();

        let mut channels: Vec<Vec<u8>> = vec![Vec::with_capacity((width * height) as usize); 4];
        for pixel in rgba.pixels() {
            for (channel, &v) in channels.iter_mut().zip(pixel.0.iter()) {
                channel.push(v);
            }
        }
        if !had_alpha {
            channels[3] = vec![255; (width * height) as usize];
        }

        let alpha = NodeValue::Image(DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, channels[3].clone())
                .expect("channel length matches dimensions"),
        ));

        let mut outputs = Vec::with_capacity(4);
        if self.grayscale {
            for channel in channels.iter().take(3) {
                outputs.push(NodeValue::Image(DynamicImage::ImageLuma8(
                    GrayImage::from_raw(width, height, channel.clone())
                        .expect("channel length matches dimensions"),
                )));
            }
        } else {
            for c in 0..3 {
                let mut raw = Vec::with_capacity((width * height * 3) as usize);
                for &v in &channels[c] {
                    for slot in 0..3 {
                        raw.push(if slot == c { v } else { 0 });
                    }
                }
                outputs.push(NodeValue::Image(DynamicImage::ImageRgb8(
                    RgbImage::from_raw(width, height, raw)
                        .expect("channel length matches dimensions"),
                )));
            }
        }
        outputs.push(alpha);
        Some(outputs)
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("grayscale", ParamValue::Boolean(v)) => {
                self.grayscale = *v;
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

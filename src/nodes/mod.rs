//! Builtin node variants

mod common;

pub mod blend;
pub mod blur;
pub mod brightness_contrast;
pub mod channel_split;
pub mod convolution;
pub mod edge_detect;
pub mod image_io;
pub mod noise;
pub mod threshold;

pub use blend::BlendNode;
pub use blur::BlurNode;
pub use brightness_contrast::BrightnessContrastNode;
pub use channel_split::ChannelSplitterNode;
pub use convolution::ConvolutionFilterNode;
pub use edge_detect::EdgeDetectionNode;
pub use image_io::{ImageInputNode, ImageOutputNode};
pub use noise::{NoiseGeneratorNode, NoiseType};
pub use threshold::ThresholdNode;

use crate::registry::NodeRegistry;

/// Registers every builtin variant under its type name.
pub fn register_builtins(registry: &mut NodeRegistry) {
    registry.register("Image Input", || Box::new(ImageInputNode::new()));
    registry.register("Image Output", || Box::new(ImageOutputNode::new()));
    registry.register("Brightness/Contrast", || {
        Box::new(BrightnessContrastNode::new())
    });
    registry.register("Blur", || Box::new(BlurNode::new()));
    registry.register("Threshold", || Box::new(ThresholdNode::new()));
    registry.register("Edge Detection", || Box::new(EdgeDetectionNode::new()));
    registry.register("Blend", || Box::new(BlendNode::new()));
    registry.register("Channel Splitter", || Box::new(ChannelSplitterNode::new()));
    registry.register("Noise Generator", || Box::new(NoiseGeneratorNode::new()));
    registry.register("Convolution Filter", || {
        Box::new(ConvolutionFilterNode::new())
    });
}

//! Procedural noise generator node

use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::{DynamicImage, GrayImage, RgbImage};
use std::any::Any;

const NOISE_SIZE: u32 = 512;

/// Base-noise flavors. All are cheap analytic functions rather than real
/// gradient noise; the octave accumulation gives them usable structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseType {
    Perlin,
    Simplex,
    Worley,
}

impl NoiseType {
    fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(NoiseType::Perlin),
            1 => Some(NoiseType::Simplex),
            2 => Some(NoiseType::Worley),
            _ => None,
        }
    }
}

/// Generates a fixed 512x512 noise field by summing octaves of a
/// frequency/persistence-scaled base function, normalized to full range.
pub struct NoiseGeneratorNode {
    noise_type: NoiseType,
    scale: f32,
    octaves: i32,
    persistence: f32,
    displacement: bool,
}

impl NoiseGeneratorNode {
    pub fn new() -> Self {
        Self {
            noise_type: NoiseType::Perlin,
            scale: 0.1,
            octaves: 4,
            persistence: 0.5,
            displacement: false,
        }
    }

    pub fn noise_type(&self) -> NoiseType {
        self.noise_type
    }

    fn base_noise(x: f32, y: f32) -> f32 {
        let n = x * 0.1 + y * 0.1;
        (n * 10.0).sin() * 0.5 + 0.5
    }

    fn sample(&self, nx: f32, ny: f32) -> f32 {
        match self.noise_type {
            NoiseType::Perlin => Self::base_noise(nx, ny),
            NoiseType::Simplex => Self::base_noise(nx * 0.5, ny * 0.5),
            NoiseType::Worley => (nx * 0.1 + ny * 0.1).rem_euclid(1.0),
        }
    }

    fn field(&self) -> Vec<f32> {
        let mut field = Vec::with_capacity((NOISE_SIZE * NOISE_SIZE) as usize);
        for y in 0..NOISE_SIZE {
            for x in 0..NOISE_SIZE {
                let mut value = 0.0f32;
                let mut amplitude = 1.0f32;
                let mut frequency = 1.0f32;
                for _ in 0..self.octaves.max(0) {
                    let nx = x as f32 * frequency * self.scale;
                    let ny = y as f32 * frequency * self.scale;
                    value += self.sample(nx, ny) * amplitude;
                    amplitude *= self.persistence;
                    frequency *= 2.0;
                }
                field.push(value);
            }
        }
        // Normalize to the full 0..1 range.
        let min = field.iter().copied().fold(f32::INFINITY, f32::min);
        let max = field.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = max - min;
        if span > 0.0 {
            for v in field.iter_mut() {
                *v = (*v - min) / span;
            }
        } else {
            field.fill(0.0);
        }
        field
    }
}

impl Default for NoiseGeneratorNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKernel for NoiseGeneratorNode {
    fn type_name(&self) -> &'static str {
        "Noise Generator"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::output(0, "Output", DataKind::Image)]
    }

    fn process(&mut self, _inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let field = self.field();
        let image = if self.displacement {
            // Displacement map: the value duplicated into three channels.
            let mut raw = Vec::with_capacity(field.len() * 3);
            for &v in &field {
                let byte = (v * 255.0).round() as u8;
                raw.extend_from_slice(&[byte, byte, byte]);
            }
            DynamicImage::ImageRgb8(
                RgbImage::from_raw(NOISE_SIZE, NOISE_SIZE, raw)
                    .expect("buffer matches dimensions"),
            )
        } else {
            let raw = field.iter().map(|&v| (v * 255.0).round() as u8).collect();
            DynamicImage::ImageLuma8(
                GrayImage::from_raw(NOISE_SIZE, NOISE_SIZE, raw)
                    .expect("buffer matches dimensions"),
            )
        };
        Some(vec![NodeValue::Image(image)])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("noise_type", ParamValue::Integer(v)) => match NoiseType::from_index(*v) {
                Some(noise_type) => {
                    self.noise_type = noise_type;
                    true
                }
                None => false,
            },
            ("scale", ParamValue::Float(v)) => {
                self.scale = *v;
                true
            }
            ("octaves", ParamValue::Integer(v)) => {
                self.octaves = *v;
                true
            }
            ("persistence", ParamValue::Float(v)) => {
                self.persistence = *v;
                true
            }
            ("displacement", ParamValue::Boolean(v)) => {
                self.displacement = *v;
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

    #[test]
    fn test_dimensions_and_determinism() {
        let mut node = NoiseGeneratorNode::new();
        let first = node.process(&Inputs::empty()).unwrap();
        let second = node.process(&Inputs::empty()).unwrap();
        let a = first[0].as_image().unwrap();
        let b = second[0].as_image().unwrap();
        assert_eq!(a.width(), 512);
        assert_eq!(a.height(), 512);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_normalized_to_full_range() {
        let mut node = NoiseGeneratorNode::new();
        let outputs = node.process(&Inputs::empty()).unwrap();
        let gray = outputs[0].as_image().unwrap().to_luma8();
        let min = gray.pixels().map(|p| p.0[0]).min().unwrap();
        let max = gray.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn test_displacement_is_three_channel() {
        let mut node = NoiseGeneratorNode::new();
        node.set_parameter(&ParameterChange::boolean("displacement", true));
        let outputs = node.process(&Inputs::empty()).unwrap();
        let image = outputs[0].as_image().unwrap();
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
        let rgb = image.to_rgb8();
        let p = rgb.get_pixel(100, 100).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn test_invalid_noise_type_rejected() {
        let mut node = NoiseGeneratorNode::new();
        assert!(!node.set_parameter(&ParameterChange::integer("noise_type", 9)));
        assert_eq!(node.noise_type(), NoiseType::Perlin);
        assert!(node.set_parameter(&ParameterChange::integer("noise_type", 2)));
        assert_eq!(node.noise_type(), NoiseType::Worley);
    }
}

//! Edge detection node

use super::common::{clamp_u8, to_gray};
use crate::kernel::{Inputs, NodeKernel};
use crate::port::{DataKind, Port};
use crate::value::{NodeValue, ParamValue, ParameterChange};
use image::{DynamicImage, GrayImage};
use std::any::Any;

const HYSTERESIS_LOW: f32 = 50.0;
const HYSTERESIS_HIGH: f32 = 150.0;

/// Grayscale edge response.
///
/// Method 0 produces a gradient-magnitude response; any other method runs a
/// hysteresis edge detector with fixed low/high thresholds 50/150.
pub struct EdgeDetectionNode {
    method: i32,
}

impl EdgeDetectionNode {
    pub fn new() -> Self {
        Self { method: 0 }
    }

    pub fn method(&self) -> i32 {
        self.method
    }
}

impl Default for EdgeDetectionNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-pixel Sobel gradients with replicated borders.
fn sobel_gradients(gray: &GrayImage) -> (Vec<f32>, Vec<f32>) {
    let width = gray.width() as i64;
    let height = gray.height() as i64;
    let at = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, width - 1) as u32;
        let y = y.clamp(0, height - 1) as u32;
        gray.get_pixel(x, y).0[0] as f32
    };
    let mut gx = vec![0.0f32; (width * height) as usize];
    let mut gy = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize;
            gx[i] = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x - 1, y)
                - at(x - 1, y + 1);
            gy[i] = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2.0 * at(x, y - 1)
                - at(x + 1, y - 1);
        }
    }
    (gx, gy)
}

/// Averaged absolute-gradient response.
fn gradient_magnitude(gray: &GrayImage) -> GrayImage {
    let (gx, gy) = sobel_gradients(gray);
    let mut out = GrayImage::new(gray.width(), gray.height());
    for (i, pixel) in out.pixels_mut().enumerate() {
        pixel.0[0] = clamp_u8(0.5 * gx[i].abs() + 0.5 * gy[i].abs());
    }
    out
}

/// Hysteresis edge detector: non-maximum suppression over the L1 gradient
/// magnitude, then double thresholding with connectivity from strong pixels.
fn hysteresis_edges(gray: &GrayImage) -> GrayImage {
    let width = gray.width() as i64;
    let height = gray.height() as i64;
    let (gx, gy) = sobel_gradients(gray);
    let magnitude: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(x, y)| x.abs() + y.abs())
        .collect();

    let mag_at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= width || y >= height {
            0.0
        } else {
            magnitude[(y * width + x) as usize]
        }
    };

    // Thin ridges: keep a pixel only if it is the local maximum along its
    // gradient direction, quantized to four directions.
    let mut thinned = vec![0.0f32; magnitude.len()];
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize;
            let m = magnitude[i];
            if m == 0.0 {
                continue;
            }
            let angle = gy[i].atan2(gx[i]).to_degrees().rem_euclid(180.0);
            let (da, db) = if !(22.5..157.5).contains(&angle) {
                ((1, 0), (-1, 0))
            } else if angle < 67.5 {
                ((1, 1), (-1, -1))
            } else if angle < 112.5 {
                ((0, 1), (0, -1))
            } else {
                ((1, -1), (-1, 1))
            };
            if m >= mag_at(x + da.0, y + da.1) && m >= mag_at(x + db.0, y + db.1) {
                thinned[i] = m;
            }
        }
    }

    // Double threshold, then grow edges from strong pixels through weak ones.
    let mut out = vec![0u8; magnitude.len()];
    let mut stack = Vec::new();
    for (i, &m) in thinned.iter().enumerate() {
        if m >= HYSTERESIS_HIGH {
            out[i] = 255;
            stack.push(i);
        }
    }
    while let Some(i) = stack.pop() {
        let x = (i as i64) % width;
        let y = (i as i64) / width;
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }
                let ni = (ny * width + nx) as usize;
                if out[ni] == 0 && thinned[ni] >= HYSTERESIS_LOW {
                    out[ni] = 255;
                    stack.push(ni);
                }
            }
        }
    }
    GrayImage::from_raw(gray.width(), gray.height(), out).expect("buffer matches dimensions")
}

impl NodeKernel for EdgeDetectionNode {
    fn type_name(&self) -> &'static str {
        "Edge Detection"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(0, "Input", DataKind::Image),
            Port::output(1, "Output", DataKind::Image),
        ]
    }

    fn process(&mut self, inputs: &Inputs) -> Option<Vec<NodeValue>> {
        let input = inputs.image(0)?;
        let gray = to_gray(input);
        let edges = if self.method == 0 {
            gradient_magnitude(&gray)
        } else {
            hysteresis_edges(&gray)
        };
        Some(vec![NodeValue::Image(DynamicImage::ImageLuma8(edges))])
    }

    fn set_parameter(&mut self, change: &ParameterChange) -> bool {
        match (change.parameter.as_str(), &change.value) {
            ("method", ParamValue::Integer(v)) => {
                self.method = *v;
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

//! Shared raster helpers for the filter kernels
//!
//! Filters operate on per-channel planes so the same convolution and blur
//! code serves grayscale, RGB and RGBA inputs. Sampling outside the image
//! replicates the border pixel.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Saturating conversion from filter arithmetic back to a channel value.
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

pub(crate) fn is_empty(image: &DynamicImage) -> bool {
    image.width() == 0 || image.height() == 0
}

/// Grayscale view of an image; multi-channel inputs are converted, single
/// channel inputs pass through.
pub(crate) fn to_gray(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaneLayout {
    Luma,
    Rgb,
    Rgba,
}

/// An image decomposed into 8-bit channel planes.
pub(crate) struct Planes {
    pub width: u32,
    pub height: u32,
    pub layout: PlaneLayout,
    pub data: Vec<Vec<u8>>,
}

pub(crate) fn split_planes(image: &DynamicImage) -> Planes {
    let (width, height) = (image.width(), image.height());
    let pixels = (width as usize) * (height as usize);
    match image {
        DynamicImage::ImageLuma8(gray) => Planes {
            width,
            height,
            layout: PlaneLayout::Luma,
            data: vec![gray.as_raw().clone()],
        },
        DynamicImage::ImageRgb8(rgb) => {
            let mut data = vec![Vec::with_capacity(pixels); 3];
            for chunk in rgb.as_raw().chunks_exact(3) {
                for (plane, &v) in data.iter_mut().zip(chunk) {
                    plane.push(v);
                }
            }
            Planes {
                width,
                height,
                layout: PlaneLayout::Rgb,
                data,
            }
        }
        other => {
            if other.color().has_alpha() {
                let rgba = other.to_rgba8();
                let mut data = vec![Vec::with_capacity(pixels); 4];
                for chunk in rgba.as_raw().chunks_exact(4) {
                    for (plane, &v) in data.iter_mut().zip(chunk) {
                        plane.push(v);
                    }
                }
                Planes {
                    width,
                    height,
                    layout: PlaneLayout::Rgba,
                    data,
                }
            } else {
                split_planes(&DynamicImage::ImageRgb8(other.to_rgb8()))
            }
        }
    }
}

pub(crate) fn merge_planes(planes: &Planes) -> DynamicImage {
    let (width, height) = (planes.width, planes.height);
    let pixels = (width as usize) * (height as usize);
    match planes.layout {
        PlaneLayout::Luma => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, planes.data[0].clone())
                .expect("plane length matches dimensions"),
        ),
        PlaneLayout::Rgb => {
            let mut raw = Vec::with_capacity(pixels * 3);
            for i in 0..pixels {
                for plane in &planes.data {
                    raw.push(plane[i]);
                }
            }
            DynamicImage::ImageRgb8(
                RgbImage::from_raw(width, height, raw).expect("plane length matches dimensions"),
            )
        }
        PlaneLayout::Rgba => {
            let mut raw = Vec::with_capacity(pixels * 4);
            for i in 0..pixels {
                for plane in &planes.data {
                    raw.push(plane[i]);
                }
            }
            DynamicImage::ImageRgba8(
                RgbaImage::from_raw(width, height, raw).expect("plane length matches dimensions"),
            )
        }
    }
}

/// Border-replicated sample of one plane.
#[inline]
pub(crate) fn sample(plane: &[u8], width: i64, height: i64, x: i64, y: i64) -> f32 {
    let x = x.clamp(0, width - 1);
    let y = y.clamp(0, height - 1);
    plane[(y * width + x) as usize] as f32
}

/// Correlates every plane with a square kernel, replicating borders.
pub(crate) fn correlate(planes: &Planes, kernel: &[f32], ksize: usize) -> Planes {
    let width = planes.width as i64;
    let height = planes.height as i64;
    let half = (ksize / 2) as i64;
    let data = planes
        .data
        .iter()
        .map(|plane| {
            let mut out = Vec::with_capacity(plane.len());
            for y in 0..height {
                for x in 0..width {
                    let mut acc = 0.0f32;
                    for ky in 0..ksize as i64 {
                        for kx in 0..ksize as i64 {
                            let w = kernel[(ky * ksize as i64 + kx) as usize];
                            acc += w * sample(plane, width, height, x + kx - half, y + ky - half);
                        }
                    }
                    out.push(clamp_u8(acc));
                }
            }
            out
        })
        .collect();
    Planes {
        width: planes.width,
        height: planes.height,
        layout: planes.layout,
        data,
    }
}

/// Normalized 1D Gaussian kernel for an odd side length.
///
/// Sigma is derived from the kernel size the way OpenCV derives it when the
/// caller passes sigma zero.
pub(crate) fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian smoothing with an odd kernel side length.
pub(crate) fn gaussian_blur(image: &DynamicImage, size: usize) -> DynamicImage {
    let kernel = gaussian_kernel(size);
    let half = (size / 2) as i64;
    let planes = split_planes(image);
    let width = planes.width as i64;
    let height = planes.height as i64;

    let data = planes
        .data
        .iter()
        .map(|plane| {
            // Horizontal pass keeps float precision for the vertical pass.
            let mut tmp = vec![0.0f32; plane.len()];
            for y in 0..height {
                for x in 0..width {
                    let mut acc = 0.0f32;
                    for (i, w) in kernel.iter().enumerate() {
                        acc += w * sample(plane, width, height, x + i as i64 - half, y);
                    }
                    tmp[(y * width + x) as usize] = acc;
                }
            }
            let mut out = Vec::with_capacity(plane.len());
            for y in 0..height {
                for x in 0..width {
                    let mut acc = 0.0f32;
                    for (i, w) in kernel.iter().enumerate() {
                        let yy = (y + i as i64 - half).clamp(0, height - 1);
                        acc += w * tmp[(yy * width + x) as usize];
                    }
                    out.push(clamp_u8(acc));
                }
            }
            out
        })
        .collect();

    merge_planes(&Planes {
        width: planes.width,
        height: planes.height,
        layout: planes.layout,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_split_merge_round_trip() {
        let mut rgb = RgbImage::new(2, 2);
        rgb.put_pixel(0, 0, Rgb([1, 2, 3]));
        rgb.put_pixel(1, 1, Rgb([200, 100, 50]));
        let image = DynamicImage::ImageRgb8(rgb);
        let round = merge_planes(&split_planes(&image));
        assert_eq!(image.as_bytes(), round.as_bytes());
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        for size in [3usize, 5, 7] {
            let kernel = gaussian_kernel(size);
            assert_eq!(kernel.len(), size);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            // Symmetric around the center tap.
            assert!((kernel[0] - kernel[size - 1]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_blur_preserves_constant_image() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, image::Luma([90])));
        let blurred = gaussian_blur(&image, 5);
        assert!(blurred.as_bytes().iter().all(|&v| v == 90));
    }

    #[test]
    fn test_identity_correlation() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(4, 3, |x, y| {
            image::Luma([(x * 10 + y) as u8])
        }));
        let planes = split_planes(&image);
        let kernel = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let out = merge_planes(&correlate(&planes, &kernel, 3));
        assert_eq!(image.as_bytes(), out.as_bytes());
    }
}

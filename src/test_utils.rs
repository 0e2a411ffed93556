//! Test utilities for upscale-ai
//!
//! This module provides fixtures and stand-in inference engines for tests.
//! It is only compiled when running tests.

#[cfg(test)]
use image::{Rgb, Rgba};

#[cfg(test)]
use crate::{Image, Tensor};

/// 2x2 RGB fixture with distinct channel values, so swizzles, crops and
/// tensor axis placement show up in assertions:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
#[cfg(test)]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// 2x2 RGBA fixture covering every alpha class the tiler and alpha split
/// treat differently:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
#[cfg(test)]
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Opaque checkerboard for pipeline runs that need more than one tile.
#[cfg(test)]
pub fn create_large_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([200, 150, 100])
        } else {
            Rgb([100, 150, 200])
        }
    })
}

/// Stand-in for a super-resolution model: nearest-neighbour upscale of the
/// spatial axes by `scale`.
#[cfg(test)]
pub fn upscale_nearest(tensor: &Tensor, scale: usize) -> Tensor {
    let shape = tensor.shape();
    let (channels, width, height) = (shape[1], shape[2], shape[3]);
    Tensor::from_shape_fn((1, channels, width * scale, height * scale), |(_, c, x, y)| {
        tensor[[0, c, x / scale, y / scale]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn create_large_test_image_with_valid_input_creates_image() {
        let image = create_large_test_image(10, 10);
        assert_eq!(image.dimensions(), (10, 10));

        // Test checkerboard pattern
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([100, 150, 200]));
        assert_eq!(image.get_pixel(0, 1), &Rgb([100, 150, 200]));
    }

    #[test]
    fn upscale_nearest_repeats_values() {
        let mut tensor = Tensor::zeros((1, 3, 2, 1));
        tensor[[0, 0, 1, 0]] = 0.5;

        let upscaled = upscale_nearest(&tensor, 3);
        assert_eq!(upscaled.shape(), &[1, 3, 6, 3]);
        assert_eq!(upscaled[[0, 0, 4, 2]], 0.5);
        assert_eq!(upscaled[[0, 0, 2, 2]], 0.0);
    }
}

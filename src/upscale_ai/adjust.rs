use std::f32::consts::PI;

use image::imageops::{self, FilterType};
use imageproc::definitions::Clamp;

use crate::upscale_ai::pixel_buffer::{PixelBuffer, PixelFormat};

/// Cosmetic adjustments and resampling applied around inference.
pub trait AdjustExt {
    /// Applies a percentage brightness/contrast adjustment to the colour
    /// channels, leaving alpha untouched.
    ///
    /// Both arguments are percentages in `-100..=100`; zero leaves the
    /// corresponding property unchanged.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use upscale_ai::{AdjustExt, PixelBuffer, PixelFormat};
    ///
    /// let buffer = PixelBuffer::new(8, 8, PixelFormat::Rgb24);
    /// let adjusted = buffer.brightness_contrast(0.0, 15.0);
    /// ```
    fn brightness_contrast(self, brightness: f32, contrast: f32) -> Self;

    /// Bicubic resample to exactly `width` x `height`, keeping the format
    /// and channel order.
    fn resize_exact(self, width: u32, height: u32) -> Self;
}

impl AdjustExt for PixelBuffer {
    fn brightness_contrast(self, brightness: f32, contrast: f32) -> Self {
        brightness_contrast(self, brightness, contrast)
    }

    fn resize_exact(self, width: u32, height: u32) -> Self {
        resize_exact(self, width, height)
    }
}

/// See [`AdjustExt::brightness_contrast`].
pub fn brightness_contrast(mut image: PixelBuffer, brightness: f32, contrast: f32) -> PixelBuffer {
    let lut = brightness_contrast_lut(brightness, contrast);
    let bpp = image.format().bytes_per_pixel() as usize;

    for y in 0..image.height() {
        image.row_mut(y).chunks_exact_mut(bpp).for_each(|pixel| {
            for value in &mut pixel[..3] {
                *value = lut[usize::from(*value)];
            }
        });
    }
    image
}

/// Linear slope/intercept transfer on normalized values.
fn brightness_contrast_lut(brightness: f32, contrast: f32) -> [u8; 256] {
    let slope = (PI * (contrast / 100.0 + 1.0) / 4.0).tan().max(0.0);
    let intercept = brightness / 100.0 + ((100.0 - brightness) / 200.0) * (1.0 - slope);

    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        let normalized = value as f32 / 255.0;
        *entry = <u8 as Clamp<f32>>::clamp(((slope * normalized + intercept) * 255.0).round());
    }
    lut
}

/// See [`AdjustExt::resize_exact`].
pub fn resize_exact(image: PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if image.dimensions() == (width, height) {
        return image;
    }

    let order = image.channel_order();
    let resized = match image.format() {
        PixelFormat::Rgb24 => PixelBuffer::from(imageops::resize(
            &image.into_rgb_image(),
            width,
            height,
            FilterType::CatmullRom,
        )),
        PixelFormat::Rgba32 => PixelBuffer::from(imageops::resize(
            &image.into_rgba_image(),
            width,
            height,
            FilterType::CatmullRom,
        )),
    };
    resized.into_channel_order(order)
}

/// Target size for the uniform pre-shrink of images wider than `2 * limit`.
///
/// Both sides lose the same number of pixels, `width - 2 * limit`, but the
/// height never drops below 60% of its original value (nor below one).
pub fn pre_shrink_dimensions(width: u32, height: u32, limit: u32) -> (u32, u32) {
    let threshold = limit.saturating_mul(2);
    if width <= threshold {
        return (width, height);
    }

    let min_height = height * 60 / 100;
    let delta = (width - threshold).min(height - min_height);
    (width - delta, (height - delta).max(1))
}

/// Dimensions after removing `percent` percent from each side.
pub fn reduced_dimensions(width: u32, height: u32, percent: u8) -> (u32, u32) {
    let percent = u64::from(percent.min(100));
    let reduce = |side: u32| {
        let removed = (u64::from(side) * percent / 100) as u32;
        (side - removed).max(1)
    };
    (reduce(width), reduce(height))
}

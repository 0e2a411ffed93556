use image::imageops::{self, FilterType};
use image::Luma;

use crate::error::{Error, Result};
use crate::upscale_ai::pixel_buffer::{PixelBuffer, PixelFormat};
use crate::Image;

/// Single-channel transparency plane split off an RGBA32 buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaPlane {
    plane: Image<Luma<u8>>,
}

impl AlphaPlane {
    pub fn from_image(plane: Image<Luma<u8>>) -> Self {
        Self { plane }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.plane.dimensions()
    }

    #[inline]
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.plane.get_pixel(x, y)[0]
    }

    pub fn as_image(&self) -> &Image<Luma<u8>> {
        &self.plane
    }

    pub fn into_image(self) -> Image<Luma<u8>> {
        self.plane
    }

    /// Bicubic resample to exactly `width` x `height`.
    #[must_use]
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self;
        }
        Self {
            plane: imageops::resize(&self.plane, width, height, FilterType::CatmullRom),
        }
    }
}

/// Trait for separating and re-attaching the alpha channel of a buffer
///
/// Colour and transparency travel through the pipeline separately so that
/// the colour planes can be sent to a three-channel model while alpha is
/// scaled with plain bicubic resampling.
pub trait AlphaSplitExt {
    /// Splits an RGBA32 buffer into an RGB24 buffer and its alpha plane.
    ///
    /// This consumes the buffer. The RGB half keeps the channel order.
    ///
    /// # Errors
    ///
    /// * `Error::FormatMismatch` - When the buffer is not RGBA32
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use upscale_ai::{AlphaSplitExt, PixelBuffer, PixelFormat};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let buffer = PixelBuffer::new(16, 16, PixelFormat::Rgba32);
    /// let (rgb, alpha) = buffer.split_alpha()?;
    /// let merged = rgb.recombine_alpha(alpha)?;
    /// # Ok(())
    /// # }
    /// ```
    fn split_alpha(self) -> Result<(PixelBuffer, AlphaPlane)>;

    /// Interleaves an alpha plane back into an RGB24 buffer.
    ///
    /// When the plane's dimensions differ from the buffer's, the plane is
    /// first resampled to match exactly. The result always has the RGB
    /// buffer's dimensions.
    ///
    /// # Errors
    ///
    /// * `Error::FormatMismatch` - When the buffer is not RGB24
    fn recombine_alpha(self, alpha: AlphaPlane) -> Result<PixelBuffer>;
}

impl AlphaSplitExt for PixelBuffer {
    fn split_alpha(self) -> Result<(PixelBuffer, AlphaPlane)> {
        split_alpha(self)
    }

    fn recombine_alpha(self, alpha: AlphaPlane) -> Result<PixelBuffer> {
        recombine_alpha(self, alpha)
    }
}

/// See [`AlphaSplitExt::split_alpha`].
pub fn split_alpha(image: PixelBuffer) -> Result<(PixelBuffer, AlphaPlane)> {
    ensure_format(&image, PixelFormat::Rgba32)?;

    let (width, height) = image.dimensions();
    let plane = Image::from_fn(width, height, |x, y| Luma([image.pixel(x, y)[3]]));
    let rgb = image.into_rgb24();

    Ok((rgb, AlphaPlane::from_image(plane)))
}

/// See [`AlphaSplitExt::recombine_alpha`].
pub fn recombine_alpha(rgb: PixelBuffer, alpha: AlphaPlane) -> Result<PixelBuffer> {
    ensure_format(&rgb, PixelFormat::Rgb24)?;

    let (width, height) = rgb.dimensions();
    let alpha = alpha.resized(width, height);
    if alpha.dimensions() != (width, height) {
        return Err(Error::DimensionMismatch {
            expected: (width, height),
            actual: alpha.dimensions(),
        });
    }

    let mut out = PixelBuffer::new(width, height, PixelFormat::Rgba32)
        .with_channel_order(rgb.channel_order());
    for y in 0..height {
        let src = rgb.row(y);
        out.row_mut(y)
            .chunks_exact_mut(4)
            .zip(src.chunks_exact(3))
            .enumerate()
            .for_each(|(x, (dst, px))| {
                dst[..3].copy_from_slice(px);
                dst[3] = alpha.value(x as u32, y);
            });
    }

    Ok(out)
}

fn ensure_format(image: &PixelBuffer, expected: PixelFormat) -> Result<()> {
    if image.format() == expected {
        Ok(())
    } else {
        Err(Error::FormatMismatch {
            expected,
            actual: image.format(),
        })
    }
}

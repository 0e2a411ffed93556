use image::{Pixel, Rgb, Rgba};

use crate::error::{Error, Result};
use crate::Image;

/// Memory layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// Three colour bytes per pixel
    Rgb24,
    /// Three colour bytes followed by one alpha byte per pixel
    Rgba32,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgb24 => 3,
            Self::Rgba32 => 4,
        }
    }

    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba32)
    }
}

/// Native byte order of the colour channels.
///
/// Alpha, when present, always follows the three colour bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Byte offsets of red, green and blue within a pixel.
    #[inline]
    pub const fn rgb_offsets(self) -> [usize; 3] {
        match self {
            Self::Rgb => [0, 1, 2],
            Self::Bgr => [2, 1, 0],
        }
    }
}

/// Owned raster with an explicit format, channel order and row stride.
///
/// Invariants: `data.len() == stride * height` and
/// `stride >= width * bytes_per_pixel`. Every conversion consumes the
/// buffer and hands back a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    order: ChannelOrder,
    stride: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled buffer with a tight stride.
    ///
    /// # Panics
    ///
    /// When a row of `width` pixels does not fit in `u32` bytes or the whole
    /// buffer does not fit in memory, like `ImageBuffer::new`. Use
    /// [`PixelBuffer::try_new`] for sizes that come from untrusted input.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        match Self::try_new(width, height, format) {
            Ok(buffer) => buffer,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a zero-filled buffer with a tight stride.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidBuffer` - When the row or buffer size overflows
    pub fn try_new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let stride = width.checked_mul(format.bytes_per_pixel());
        let len = stride.and_then(|stride| buffer_len(stride, height));
        match (stride, len) {
            (Some(stride), Some(len)) => Ok(Self {
                width,
                height,
                format,
                order: ChannelOrder::Rgb,
                stride,
                data: vec![0; len],
            }),
            _ => Err(Error::InvalidBuffer {
                width,
                height,
                stride: stride.unwrap_or(u32::MAX),
                expected: len.unwrap_or(usize::MAX),
                actual: 0,
            }),
        }
    }

    /// Wraps tightly packed pixel bytes.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidBuffer` - When `data` is not exactly
    ///   `width * height * bytes_per_pixel` long, or that size overflows
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let stride = width.saturating_mul(format.bytes_per_pixel());
        Self::from_raw_with_stride(width, height, format, stride, data)
    }

    /// Wraps pixel bytes whose rows may carry trailing padding.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidBuffer` - When the stride is shorter than a row of
    ///   pixels, a row of pixels overflows `u32`, or `data` is not exactly
    ///   `stride * height` long
    pub fn from_raw_with_stride(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: u32,
        data: Vec<u8>,
    ) -> Result<Self> {
        let min_stride = width.checked_mul(format.bytes_per_pixel());
        let expected = buffer_len(stride, height);
        match (min_stride, expected) {
            (Some(min_stride), Some(expected))
                if stride >= min_stride && data.len() == expected =>
            {
                Ok(Self {
                    width,
                    height,
                    format,
                    order: ChannelOrder::Rgb,
                    stride,
                    data,
                })
            }
            _ => Err(Error::InvalidBuffer {
                width,
                height,
                stride,
                expected: expected.unwrap_or(usize::MAX),
                actual: data.len(),
            }),
        }
    }

    /// Reinterprets the colour bytes as being stored in `order`.
    ///
    /// No bytes move; use [`PixelBuffer::into_channel_order`] to swizzle.
    #[must_use]
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub const fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    #[inline]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel bytes of row `y`, without stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride as usize;
        let len = self.row_len();
        &self.data[start..start + len]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride as usize;
        let len = self.row_len();
        &mut self.data[start..start + len]
    }

    /// Bytes of the pixel at `(x, y)` in native order.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel() as usize;
        let start = x as usize * bpp;
        &self.row(y)[start..start + bpp]
    }

    #[inline]
    fn row_len(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel() as usize
    }

    /// Copies a rectangular region into a new tightly packed buffer.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidRegion` - When the region extends past the buffer
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(Error::InvalidRegion {
                x,
                y,
                width,
                height,
                bounds: self.dimensions(),
            });
        }

        let bpp = self.format.bytes_per_pixel() as usize;
        let mut out = Self::new(width, height, self.format).with_channel_order(self.order);
        let start = x as usize * bpp;
        let len = width as usize * bpp;
        for row in 0..height {
            out.row_mut(row)
                .copy_from_slice(&self.row(y + row)[start..start + len]);
        }
        Ok(out)
    }

    /// Drops the alpha channel, keeping the channel order.
    pub fn into_rgb24(self) -> Self {
        if self.format == PixelFormat::Rgb24 {
            return self;
        }
        let mut out = Self::new(self.width, self.height, PixelFormat::Rgb24)
            .with_channel_order(self.order);
        for y in 0..self.height {
            let src = self.row(y);
            out.row_mut(y)
                .chunks_exact_mut(3)
                .zip(src.chunks_exact(4))
                .for_each(|(dst, px)| dst.copy_from_slice(&px[..3]));
        }
        out
    }

    /// Adds an opaque alpha channel, keeping the channel order.
    pub fn into_rgba32(self) -> Self {
        if self.format == PixelFormat::Rgba32 {
            return self;
        }
        let mut out = Self::new(self.width, self.height, PixelFormat::Rgba32)
            .with_channel_order(self.order);
        for y in 0..self.height {
            let src = self.row(y);
            out.row_mut(y)
                .chunks_exact_mut(4)
                .zip(src.chunks_exact(3))
                .for_each(|(dst, px)| {
                    dst[..3].copy_from_slice(px);
                    dst[3] = u8::MAX;
                });
        }
        out
    }

    /// Swizzles the colour bytes into `order`.
    pub fn into_channel_order(mut self, order: ChannelOrder) -> Self {
        if self.order == order {
            return self;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        for y in 0..self.height {
            self.row_mut(y)
                .chunks_exact_mut(bpp)
                .for_each(|px| px.swap(0, 2));
        }
        self.order = order;
        self
    }

    /// Converts to an `image` RGB buffer, discarding alpha and stride padding.
    pub fn into_rgb_image(self) -> Image<Rgb<u8>> {
        self.into_rgb24()
            .into_channel_order(ChannelOrder::Rgb)
            .copy_to_image()
    }

    /// Converts to an `image` RGBA buffer; opaque sources gain full alpha.
    pub fn into_rgba_image(self) -> Image<Rgba<u8>> {
        self.into_rgba32()
            .into_channel_order(ChannelOrder::Rgb)
            .copy_to_image()
    }

    /// Row-by-row copy into an image whose pixel has the same byte width.
    fn copy_to_image<P: Pixel<Subpixel = u8>>(&self) -> Image<P> {
        let mut image = Image::<P>::new(self.width, self.height);
        let row_len = self.row_len();
        if row_len == 0 {
            return image;
        }
        image
            .chunks_exact_mut(row_len)
            .zip(0..)
            .for_each(|(dst, y)| dst.copy_from_slice(self.row(y)));
        image
    }
}

/// `stride * height` in bytes, `None` when it overflows `usize`.
#[inline]
fn buffer_len(stride: u32, height: u32) -> Option<usize> {
    (stride as usize).checked_mul(height as usize)
}

impl From<Image<Rgb<u8>>> for PixelBuffer {
    fn from(image: Image<Rgb<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgb24,
            order: ChannelOrder::Rgb,
            stride: width * 3,
            data: image.into_raw(),
        }
    }
}

impl From<Image<Rgba<u8>>> for PixelBuffer {
    fn from(image: Image<Rgba<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgba32,
            order: ChannelOrder::Rgb,
            stride: width * 4,
            data: image.into_raw(),
        }
    }
}

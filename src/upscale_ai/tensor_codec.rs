use imageproc::definitions::Clamp;
use ndarray::Array4;

use crate::error::{Error, Result};
use crate::upscale_ai::pixel_buffer::{ChannelOrder, PixelBuffer, PixelFormat};

/// Normalized float tensor laid out as `[batch = 1, channel = R,G,B, x, y]`.
pub type Tensor = Array4<f32>;

const CHANNELS: usize = 3;
const TENSOR_LAYOUT: &str = "[1, 3, width, height]";

/// Conversion between RGB24 buffers and inference tensors.
pub trait TensorCodecExt {
    /// Converts the buffer into a `[1, 3, width, height]` tensor with
    /// values in `[0, 1]` and channels in R,G,B order.
    ///
    /// This consumes the buffer.
    ///
    /// # Errors
    ///
    /// * `Error::FormatMismatch` - When the buffer is not RGB24
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use upscale_ai::{PixelBuffer, PixelFormat, TensorCodecExt};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let buffer = PixelBuffer::new(64, 32, PixelFormat::Rgb24);
    /// let tensor = buffer.into_tensor()?;
    /// assert_eq!(tensor.shape(), &[1, 3, 64, 32]);
    /// # Ok(())
    /// # }
    /// ```
    fn into_tensor(self) -> Result<Tensor>;
}

impl TensorCodecExt for PixelBuffer {
    fn into_tensor(self) -> Result<Tensor> {
        encode_tensor(self)
    }
}

/// See [`TensorCodecExt::into_tensor`].
pub fn encode_tensor(image: PixelBuffer) -> Result<Tensor> {
    if image.format() != PixelFormat::Rgb24 {
        return Err(Error::FormatMismatch {
            expected: PixelFormat::Rgb24,
            actual: image.format(),
        });
    }

    let (width, height) = image.dimensions();
    let offsets = image.channel_order().rgb_offsets();
    let mut tensor = Tensor::zeros((1, CHANNELS, width as usize, height as usize));

    for y in 0..height {
        for (x, pixel) in image.row(y).chunks_exact(3).enumerate() {
            for (channel, &offset) in offsets.iter().enumerate() {
                tensor[[0, channel, x, y as usize]] = f32::from(pixel[offset]) / 255.0;
            }
        }
    }

    Ok(tensor)
}

/// Converts an inference tensor back into an RGB24 buffer stored in `order`.
///
/// Values are clamped to `[0, 1]` before scaling; inference output is not
/// guaranteed to stay in range.
///
/// # Errors
///
/// * `Error::InvalidTensorShape` - When the tensor is not `[1, 3, w, h]`
/// * `Error::InvalidBuffer` - When `w x h` pixels cannot be stored
pub fn decode_tensor(tensor: Tensor, order: ChannelOrder) -> Result<PixelBuffer> {
    let shape = tensor.shape();
    if shape[0] != 1 || shape[1] != CHANNELS {
        return Err(Error::InvalidTensorShape {
            expected: TENSOR_LAYOUT,
            actual: shape.to_vec(),
        });
    }

    let (Ok(width), Ok(height)) = (u32::try_from(shape[2]), u32::try_from(shape[3])) else {
        return Err(Error::InvalidTensorShape {
            expected: TENSOR_LAYOUT,
            actual: shape.to_vec(),
        });
    };
    let offsets = order.rgb_offsets();
    let mut image =
        PixelBuffer::try_new(width, height, PixelFormat::Rgb24)?.with_channel_order(order);

    for y in 0..height {
        for (x, pixel) in image.row_mut(y).chunks_exact_mut(3).enumerate() {
            for (channel, &offset) in offsets.iter().enumerate() {
                pixel[offset] = to_byte(tensor[[0, channel, x, y as usize]]);
            }
        }
    }

    Ok(image)
}

#[inline]
fn to_byte(value: f32) -> u8 {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    <u8 as Clamp<f32>>::clamp((value * 255.0).round())
}

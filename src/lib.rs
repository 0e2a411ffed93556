mod error;
mod upscale_ai;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::{Error, Result};
pub use upscale_ai::adjust::{
    brightness_contrast, pre_shrink_dimensions, reduced_dimensions, resize_exact, AdjustExt,
};
pub use upscale_ai::alpha_split::{recombine_alpha, split_alpha, AlphaPlane, AlphaSplitExt};
pub use upscale_ai::compositor::{combine_columns, combine_rows};
pub use upscale_ai::config::{ContrastStage, EnhancementConfig, DEFAULT_OVER_DIMENSION_LIMIT};
pub use upscale_ai::inference::{Inference, InferenceContext};
pub use upscale_ai::pipeline::{enhance, EnhancementPipeline};
pub use upscale_ai::pixel_buffer::{ChannelOrder, PixelBuffer, PixelFormat};
pub use upscale_ai::tensor_codec::{decode_tensor, encode_tensor, Tensor, TensorCodecExt};
pub use upscale_ai::tiler::{
    non_transparent_bounds, split_into_tiles, Rect, Tile, TileGrid, TileSplitExt,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

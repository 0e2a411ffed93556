pub mod adjust;
pub mod alpha_split;
pub mod compositor;
pub mod config;
pub mod inference;
pub mod pipeline;
pub mod pixel_buffer;
pub mod tensor_codec;
pub mod tiler;

use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::upscale_ai::adjust::{
    brightness_contrast, pre_shrink_dimensions, reduced_dimensions, resize_exact,
};
use crate::upscale_ai::alpha_split::{recombine_alpha, split_alpha};
use crate::upscale_ai::compositor::{combine_columns, combine_rows};
use crate::upscale_ai::config::EnhancementConfig;
use crate::upscale_ai::inference::{Inference, InferenceContext};
use crate::upscale_ai::pixel_buffer::PixelBuffer;
use crate::upscale_ai::tensor_codec::{decode_tensor, encode_tensor};
use crate::upscale_ai::tiler::{split_into_tiles, Tile};

/// Tiled enhancement of arbitrarily large images with a fixed-size model.
///
/// The run is linear: optional pre-shrink, tiling, per-tile inference with
/// alpha carried alongside, stitching, then optional reduction and
/// contrast. Any failing tile fails the whole run.
///
/// The pipeline borrows the [`InferenceContext`]; loading and releasing the
/// model stay with the caller.
#[derive(Debug, Clone)]
pub struct EnhancementPipeline<'a, I> {
    config: EnhancementConfig,
    context: &'a InferenceContext<I>,
}

impl<'a, I: Inference> EnhancementPipeline<'a, I> {
    /// # Errors
    ///
    /// * `Error::InvalidConfig` - When `config` does not validate
    pub fn new(config: EnhancementConfig, context: &'a InferenceContext<I>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, context })
    }

    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    pub fn context(&self) -> &'a InferenceContext<I> {
        self.context
    }

    /// Enhances `image`, processing tiles one after another.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyGrid` - When the image has no pixels
    /// * `Error::InferenceFailed` - When the engine fails on any tile
    /// * `Error::FormatMismatch` - When stages disagree on pixel formats
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use upscale_ai::{EnhancementConfig, EnhancementPipeline, InferenceContext};
    /// use upscale_ai::{PixelBuffer, PixelFormat, Tensor};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let context = InferenceContext::new(|tensor: Tensor| Some(tensor), "identity");
    /// let pipeline = EnhancementPipeline::new(EnhancementConfig::default(), &context)?;
    ///
    /// let output = pipeline.enhance(PixelBuffer::new(300, 900, PixelFormat::Rgb24))?;
    /// assert_eq!(output.dimensions(), (300, 900));
    /// # Ok(())
    /// # }
    /// ```
    pub fn enhance(&self, image: PixelBuffer) -> Result<PixelBuffer> {
        let bands = self
            .prepare(image)?
            .into_iter()
            .enumerate()
            .map(|(band, blocks)| {
                blocks
                    .into_iter()
                    .enumerate()
                    .map(|(block, tile)| self.enhance_tile(tile, band, block))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        self.finish(bands)
    }

    /// Same as [`EnhancementPipeline::enhance`] with tiles processed on the
    /// rayon thread pool. The output is identical.
    ///
    /// # Errors
    ///
    /// See [`EnhancementPipeline::enhance`].
    #[cfg(feature = "rayon")]
    pub fn enhance_parallel(&self, image: PixelBuffer) -> Result<PixelBuffer>
    where
        I: Sync,
    {
        use rayon::prelude::*;

        let bands = self
            .prepare(image)?
            .into_par_iter()
            .enumerate()
            .map(|(band, blocks)| {
                blocks
                    .into_par_iter()
                    .enumerate()
                    .map(|(block, tile)| self.enhance_tile(tile, band, block))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        self.finish(bands)
    }

    /// Pre-shrink and tiling.
    fn prepare(&self, image: PixelBuffer) -> Result<Vec<Vec<Tile>>> {
        if image.is_empty() {
            return Err(Error::EmptyGrid);
        }
        let (width, height) = image.dimensions();
        info!(
            model = %self.context.model_name(),
            width,
            height,
            format = ?image.format(),
            "enhancement started"
        );

        let limit = self.config.over_dimension_limit;
        let (target_width, target_height) = pre_shrink_dimensions(width, height, limit);
        let image = if (target_width, target_height) != (width, height) {
            debug!(
                from = ?(width, height),
                to = ?(target_width, target_height),
                "pre-shrinking oversized input"
            );
            resize_exact(image, target_width, target_height)
        } else {
            image
        };

        let grid = split_into_tiles(image, limit)?;
        debug!(bands = grid.band_count(), tiles = grid.tile_count(), "tiled input");
        Ok(grid.into_bands())
    }

    fn enhance_tile(&self, tile: Tile, band: usize, block: usize) -> Result<PixelBuffer> {
        let Tile { buffer, origin } = tile;
        trace!(band, block, ?origin, size = ?buffer.dimensions(), "enhancing tile");

        let order = buffer.channel_order();
        let (buffer, alpha) = if self.config.preserve_alpha && buffer.format().has_alpha() {
            let (rgb, alpha) = split_alpha(buffer)?;
            (rgb, Some(alpha))
        } else {
            (buffer, None)
        };
        let mut buffer = buffer.into_rgb24();

        if self.config.contrast_adjust > 0 && self.config.contrast_stage.applies_pre_inference() {
            buffer = brightness_contrast(buffer, 0.0, self.config.effective_contrast() as f32);
        }

        let output = self.context.run(encode_tensor(buffer)?, band, block)?;
        let enhanced = decode_tensor(output, order)?;

        match alpha {
            Some(alpha) => recombine_alpha(enhanced, alpha),
            None => Ok(enhanced),
        }
    }

    /// Stitching and post-processing.
    fn finish(&self, bands: Vec<Vec<PixelBuffer>>) -> Result<PixelBuffer> {
        let rows = bands
            .into_iter()
            .map(|blocks| stitch(blocks, combine_columns))
            .collect::<Result<Vec<_>>>()?;
        let mut image = stitch(rows, combine_rows)?;

        if self.config.reduces_output() {
            let (width, height) = image.dimensions();
            let (target_width, target_height) =
                reduced_dimensions(width, height, self.config.reduction_percentage);
            debug!(
                percent = self.config.reduction_percentage,
                to = ?(target_width, target_height),
                "reducing output"
            );
            image = resize_exact(image, target_width, target_height);
        }

        if self.config.contrast_adjust > 0 && self.config.contrast_stage.applies_post_composite() {
            image = brightness_contrast(image, 0.0, self.config.effective_contrast() as f32);
        }

        info!(
            width = image.width(),
            height = image.height(),
            "enhancement finished"
        );
        Ok(image)
    }
}

/// Single buffers pass through untouched.
fn stitch<F>(mut parts: Vec<PixelBuffer>, combine: F) -> Result<PixelBuffer>
where
    F: FnOnce(Vec<PixelBuffer>) -> Result<PixelBuffer>,
{
    if parts.len() == 1 {
        return parts.pop().ok_or(Error::EmptyGrid);
    }
    combine(parts)
}

/// Validates `config`, then runs [`EnhancementPipeline::enhance`] once.
///
/// # Errors
///
/// See [`EnhancementPipeline::new`] and [`EnhancementPipeline::enhance`].
pub fn enhance<I: Inference>(
    image: PixelBuffer,
    config: &EnhancementConfig,
    context: &InferenceContext<I>,
) -> Result<PixelBuffer> {
    EnhancementPipeline::new(*config, context)?.enhance(image)
}

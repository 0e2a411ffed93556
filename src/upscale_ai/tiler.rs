use crate::error::{Error, Result};
use crate::upscale_ai::pixel_buffer::PixelBuffer;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A materialized sub-region of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub buffer: PixelBuffer,
    /// Top-left corner in the source image's coordinates
    pub origin: (u32, u32),
}

/// Tiles keyed by (band, block), bands top to bottom and blocks left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    bands: Vec<Vec<Tile>>,
}

impl TileGrid {
    pub fn get(&self, band: usize, block: usize) -> Option<&Tile> {
        self.bands.get(band)?.get(block)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Number of blocks in each band.
    pub fn shape(&self) -> Vec<usize> {
        self.bands.iter().map(Vec::len).collect()
    }

    pub fn tile_count(&self) -> usize {
        self.bands.iter().map(Vec::len).sum()
    }

    /// Row-major iteration yielding `(band, block, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        self.bands.iter().enumerate().flat_map(|(band, blocks)| {
            blocks
                .iter()
                .enumerate()
                .map(move |(block, tile)| (band, block, tile))
        })
    }

    pub fn into_bands(self) -> Vec<Vec<Tile>> {
        self.bands
    }
}

/// Trait for cutting a buffer into model-sized tiles
pub trait TileSplitExt {
    /// Partitions the buffer into horizontal bands of at most `limit` rows,
    /// then splits every band wider than `limit` into blocks of at most
    /// `limit` columns.
    ///
    /// Bands and blocks cut from a buffer with alpha are trimmed to their
    /// non-transparent bounds. A buffer no larger than `limit` in either
    /// direction yields a 1x1 grid holding the buffer itself.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidConfig` - When `limit` is zero
    /// * `Error::EmptyGrid` - When the buffer has no pixels
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use upscale_ai::{PixelBuffer, PixelFormat, TileSplitExt};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let grid = PixelBuffer::new(700, 650, PixelFormat::Rgb24).split_into_tiles(300)?;
    /// assert_eq!(grid.shape(), vec![3, 3, 3]);
    /// # Ok(())
    /// # }
    /// ```
    fn split_into_tiles(self, limit: u32) -> Result<TileGrid>;
}

impl TileSplitExt for PixelBuffer {
    fn split_into_tiles(self, limit: u32) -> Result<TileGrid> {
        split_into_tiles(self, limit)
    }
}

/// See [`TileSplitExt::split_into_tiles`].
pub fn split_into_tiles(image: PixelBuffer, limit: u32) -> Result<TileGrid> {
    if limit == 0 {
        return Err(Error::InvalidConfig(
            "tile limit must be greater than zero".to_string(),
        ));
    }
    if image.is_empty() {
        return Err(Error::EmptyGrid);
    }

    let bands = if image.height() > limit {
        horizontal_split(&image, limit)?
    } else {
        vec![Tile {
            buffer: image,
            origin: (0, 0),
        }]
    };

    let bands = bands
        .into_iter()
        .map(|band| {
            if band.buffer.width() > limit {
                vertical_split(&band, limit)
            } else {
                Ok(vec![band])
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TileGrid { bands })
}

fn horizontal_split(image: &PixelBuffer, limit: u32) -> Result<Vec<Tile>> {
    let (width, height) = image.dimensions();
    (0..height)
        .step_by(limit as usize)
        .map(|y| {
            let band = image.crop(0, y, width, limit.min(height - y))?;
            trim_transparent(band, (0, y))
        })
        .collect()
}

fn vertical_split(band: &Tile, limit: u32) -> Result<Vec<Tile>> {
    let (width, height) = band.buffer.dimensions();
    let (origin_x, origin_y) = band.origin;
    (0..width)
        .step_by(limit as usize)
        .map(|x| {
            let block = band.buffer.crop(x, 0, limit.min(width - x), height)?;
            trim_transparent(block, (origin_x + x, origin_y))
        })
        .collect()
}

fn trim_transparent(buffer: PixelBuffer, origin: (u32, u32)) -> Result<Tile> {
    let bounds = non_transparent_bounds(&buffer);
    let origin = (origin.0 + bounds.x, origin.1 + bounds.y);
    if (bounds.width, bounds.height) == buffer.dimensions() {
        return Ok(Tile { buffer, origin });
    }
    let buffer = buffer.crop(bounds.x, bounds.y, bounds.width, bounds.height)?;
    Ok(Tile { buffer, origin })
}

/// Tight bounds of the pixels whose alpha is not zero.
///
/// Buffers without alpha, and buffers that are fully transparent, report
/// their full extent.
pub fn non_transparent_bounds(image: &PixelBuffer) -> Rect {
    let (width, height) = image.dimensions();
    let full = Rect::new(0, 0, width, height);
    if !image.format().has_alpha() {
        return full;
    }

    let opaque = |x: u32, y: u32| image.pixel(x, y)[3] != 0;
    let row_has_content = |y: u32| (0..width).any(|x| opaque(x, y));

    let Some(top) = (0..height).find(|&y| row_has_content(y)) else {
        return full;
    };
    let bottom = (top..height)
        .rev()
        .find(|&y| row_has_content(y))
        .unwrap_or(top);

    let column_has_content = |x: u32| (top..=bottom).any(|y| opaque(x, y));
    let left = (0..width).find(|&x| column_has_content(x)).unwrap_or(0);
    let right = (left..width)
        .rev()
        .find(|&x| column_has_content(x))
        .unwrap_or(left);

    Rect::new(left, top, right - left + 1, bottom - top + 1)
}

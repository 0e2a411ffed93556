use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::upscale_ai::pixel_buffer::PixelBuffer;

/// Stacks buffers top to bottom.
///
/// The result is as wide as the widest buffer and as tall as all of them
/// together. Narrower buffers are left-aligned; the columns they do not
/// cover stay zeroed.
///
/// # Errors
///
/// * `Error::EmptyGrid` - When `tiles` is empty
/// * `Error::FormatMismatch` - When the buffers do not share one format
pub fn combine_rows(tiles: Vec<PixelBuffer>) -> Result<PixelBuffer> {
    let first = validate_tiles(&tiles)?;
    let width = tiles.iter().map(PixelBuffer::width).max().unwrap_or(0);
    let height = tiles.iter().map(PixelBuffer::height).sum();
    let mut out = canvas_like(first, width, height);

    let mut offset_y = 0;
    for tile in &tiles {
        blit(&mut out, tile, 0, offset_y);
        offset_y += tile.height();
    }
    Ok(out)
}

/// Places buffers side by side, left to right.
///
/// The result is as tall as the tallest buffer and as wide as all of them
/// together. Shorter buffers are top-aligned.
///
/// # Errors
///
/// * `Error::EmptyGrid` - When `tiles` is empty
/// * `Error::FormatMismatch` - When the buffers do not share one format
pub fn combine_columns(tiles: Vec<PixelBuffer>) -> Result<PixelBuffer> {
    let first = validate_tiles(&tiles)?;
    let width = tiles.iter().map(PixelBuffer::width).sum();
    let height = tiles.iter().map(PixelBuffer::height).max().unwrap_or(0);
    let mut out = canvas_like(first, width, height);

    let mut offset_x = 0;
    for tile in &tiles {
        blit(&mut out, tile, offset_x, 0);
        offset_x += tile.width();
    }
    Ok(out)
}

fn validate_tiles(tiles: &[PixelBuffer]) -> Result<&PixelBuffer> {
    let first = tiles.first().ok_or(Error::EmptyGrid)?;
    if let Some(odd) = tiles.iter().find(|tile| tile.format() != first.format()) {
        return Err(Error::FormatMismatch {
            expected: first.format(),
            actual: odd.format(),
        });
    }
    Ok(first)
}

fn canvas_like(tile: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::new(width, height, tile.format()).with_channel_order(tile.channel_order())
}

fn blit(canvas: &mut PixelBuffer, tile: &PixelBuffer, x: u32, y: u32) {
    let bpp = canvas.format().bytes_per_pixel() as usize;
    let start = x as usize * bpp;
    let tile = if tile.channel_order() == canvas.channel_order() {
        Cow::Borrowed(tile)
    } else {
        Cow::Owned(tile.clone().into_channel_order(canvas.channel_order()))
    };
    for row in 0..tile.height() {
        let src = tile.row(row);
        canvas.row_mut(y + row)[start..start + src.len()].copy_from_slice(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelOrder, PixelFormat};

    fn solid(width: u32, height: u32, value: u8) -> PixelBuffer {
        let data = vec![value; (width * height * 3) as usize];
        PixelBuffer::from_raw(width, height, PixelFormat::Rgb24, data).unwrap()
    }

    #[test]
    fn combine_rows_stacks_vertically() {
        let combined = combine_rows(vec![solid(4, 2, 10), solid(4, 3, 20)]).unwrap();

        assert_eq!(combined.dimensions(), (4, 5));
        assert_eq!(combined.pixel(3, 1), &[10, 10, 10]);
        assert_eq!(combined.pixel(0, 2), &[20, 20, 20]);
    }

    #[test]
    fn combine_rows_left_aligns_narrow_tiles() {
        let combined = combine_rows(vec![solid(4, 1, 10), solid(2, 1, 20)]).unwrap();

        assert_eq!(combined.dimensions(), (4, 2));
        assert_eq!(combined.pixel(1, 1), &[20, 20, 20]);
        assert_eq!(combined.pixel(3, 1), &[0, 0, 0]);
    }

    #[test]
    fn combine_columns_places_side_by_side() {
        let combined = combine_columns(vec![solid(2, 3, 10), solid(1, 3, 20)]).unwrap();

        assert_eq!(combined.dimensions(), (3, 3));
        assert_eq!(combined.pixel(1, 2), &[10, 10, 10]);
        assert_eq!(combined.pixel(2, 0), &[20, 20, 20]);
    }

    #[test]
    fn combine_columns_uses_tallest_tile() {
        let combined = combine_columns(vec![solid(1, 1, 10), solid(1, 4, 20)]).unwrap();
        assert_eq!(combined.dimensions(), (2, 4));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(combine_rows(Vec::new()), Err(Error::EmptyGrid));
        assert_eq!(combine_columns(Vec::new()), Err(Error::EmptyGrid));
    }

    #[test]
    fn mixed_formats_are_rejected() {
        let rgba = PixelBuffer::new(1, 1, PixelFormat::Rgba32);
        let result = combine_columns(vec![solid(1, 1, 0), rgba]);
        assert!(matches!(
            result,
            Err(Error::FormatMismatch {
                expected: PixelFormat::Rgb24,
                actual: PixelFormat::Rgba32,
            })
        ));
    }

    #[test]
    fn tiles_follow_canvas_channel_order() {
        let bgr = PixelBuffer::from_raw(1, 1, PixelFormat::Rgb24, vec![1, 2, 3])
            .unwrap()
            .with_channel_order(ChannelOrder::Bgr);
        let rgb = PixelBuffer::from_raw(1, 1, PixelFormat::Rgb24, vec![1, 2, 3]).unwrap();

        let combined = combine_columns(vec![bgr, rgb]).unwrap();
        assert_eq!(combined.channel_order(), ChannelOrder::Bgr);
        assert_eq!(combined.pixel(1, 0), &[3, 2, 1]);
    }
}

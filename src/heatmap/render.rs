//! Raster export of a heatmap grid.

use std::path::Path;

use image::error::{ImageError, LimitError, LimitErrorKind};
use image::{ImageResult, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;

use super::grid::HeatmapGrid;
use crate::view::confidence_color;

const EMPTY_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Largest width or height of an exported image, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 1 << 15;

/// Draw `grid` with `cell_size` pixel square cells.
///
/// Filled cells use the confidence hue (red at 0, green at 1); empty cells
/// stay black. Fails when either side would exceed [`MAX_IMAGE_SIDE`].
pub fn render_heatmap(grid: &HeatmapGrid, cell_size: u32) -> ImageResult<RgbImage> {
    let cell_size = cell_size.max(1);
    let width = side_length(grid.cols(), cell_size)?;
    let height = side_length(grid.rows(), cell_size)?;
    let mut img = RgbImage::from_pixel(width, height, EMPTY_COLOR);

    for (row, col, cell) in grid.iter() {
        let Some(mean) = cell.mean() else {
            continue;
        };
        let Some(color) = confidence_color(mean) else {
            continue;
        };

        let x = col as u32 * cell_size;
        let y = row as u32 * cell_size;
        draw_filled_rect_mut(
            &mut img,
            PixelRect::at(x as i32, y as i32).of_size(cell_size, cell_size),
            Rgb(color),
        );
    }

    Ok(img)
}

fn side_length(cells: usize, cell_size: u32) -> ImageResult<u32> {
    u32::try_from(cells)
        .ok()
        .and_then(|cells| cells.checked_mul(cell_size))
        .filter(|side| *side <= MAX_IMAGE_SIDE)
        .ok_or_else(|| ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)))
}

/// Render `grid` and write it as a PNG.
pub fn save_heatmap_png(grid: &HeatmapGrid, cell_size: u32, path: &Path) -> ImageResult<()> {
    render_heatmap(grid, cell_size)?.save_with_format(path, image::ImageFormat::Png)
}

//! Rolling confidence heatmap of where hands have been detected.

mod aggregator;
mod grid;
mod render;

pub use aggregator::HeatmapAggregator;
pub use grid::{GridError, HeatmapCell, HeatmapGrid};
pub use render::{render_heatmap, save_heatmap_png, MAX_IMAGE_SIDE};

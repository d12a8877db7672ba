//! Bounded history of hand samples and the grid rebuilt from it.

use std::collections::VecDeque;

use super::grid::{GridError, HeatmapGrid};
use crate::geometry::Rect;
use crate::sensor::HandSample;
use crate::settings::HeatmapSettings;

/// Rolling heatmap over the most recent `max_history` samples.
///
/// Every update rebuilds the grid from the whole history rather than
/// adjusting running averages, so evicted samples drop out exactly.
#[derive(Debug, Clone)]
pub struct HeatmapAggregator {
    settings: HeatmapSettings,
    history: VecDeque<HandSample>,
    grid: HeatmapGrid,
    /// Samples in history that did not land in any cell on the last rebuild.
    unbinned: usize,
}

impl HeatmapAggregator {
    pub fn new(settings: HeatmapSettings) -> Result<Self, GridError> {
        let grid = HeatmapGrid::new(settings.rows, settings.cols)?;
        Ok(Self {
            settings,
            history: VecDeque::with_capacity(settings.max_history.min(1024)),
            grid,
            unbinned: 0,
        })
    }

    /// Append `hands` to the history and rebuild the grid.
    ///
    /// Positions are normalized against `reference`; with no reference
    /// rectangle nothing is binned, though the history still grows.
    pub fn update(&mut self, hands: &[HandSample], reference: Option<&Rect>) -> &HeatmapGrid {
        self.history.extend(hands.iter().copied());
        let excess = self.history.len().saturating_sub(self.settings.max_history);
        if excess > 0 {
            self.history.drain(..excess);
        }

        self.rebuild(reference);
        &self.grid
    }

    /// Rebuild the grid from the current history against `reference`.
    pub fn rebuild(&mut self, reference: Option<&Rect>) -> &HeatmapGrid {
        let rows = self.settings.rows;
        let cols = self.settings.cols;
        let locator = &self.grid;

        let binned: Vec<(usize, usize, f64)> = match reference {
            Some(rect) => self
                .history
                .iter()
                .filter_map(|hand| {
                    locator
                        .locate(rect.norm_x(hand.x), rect.norm_y(hand.y))
                        .map(|(row, col)| (row, col, hand.confidence))
                })
                .collect(),
            None => Vec::new(),
        };

        self.unbinned = self.history.len() - binned.len();
        // Dimensions were validated in `new`.
        if let Ok(grid) = HeatmapGrid::from_samples(rows, cols, binned) {
            self.grid = grid;
        }

        tracing::trace!(
            "Heatmap rebuilt: {} samples, {} filled cells, {} unbinned",
            self.history.len(),
            self.grid.filled_cells(),
            self.unbinned
        );

        &self.grid
    }

    pub fn grid(&self) -> &HeatmapGrid {
        &self.grid
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// History from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = &HandSample> {
        self.history.iter()
    }

    pub fn unbinned(&self) -> usize {
        self.unbinned
    }

    pub fn settings(&self) -> &HeatmapSettings {
        &self.settings
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.rebuild(None);
    }
}

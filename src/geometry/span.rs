//! One-dimensional coordinate range.

use serde::{Deserialize, Serialize};

/// An ordered pair `(min, max)` describing a coordinate range.
///
/// `min` is not required to be below `max`; a reversed span maps in the
/// opposite direction. Normalization is never clamped, so values outside the
/// span produce results outside `[0, 1]`. A zero-width span yields `NaN` or
/// an infinity from [`Span::normalize`]; callers discard non-finite results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Signed length of the span.
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `v` relative to the span, `0` at `min` and `1` at `max`.
    pub fn normalize(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    /// Inverse of [`Span::normalize`].
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }

    /// Remap `v` from this span into `target`.
    pub fn map_to_span(&self, v: f64, target: &Span) -> f64 {
        target.lerp(self.normalize(v))
    }
}

//! Axis-aligned rectangle built from two spans.

use serde::{Deserialize, Serialize};

use super::Span;

/// Rectangle with origin `(x, y)` and signed extents `w`, `h`.
///
/// Negative extents are kept as-is because the sign encodes the mapping
/// direction; [`Rect::absolutized`] produces the positive form for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from its horizontal and vertical spans.
    pub fn from_spans(horizontal: Span, vertical: Span) -> Self {
        Self {
            x: horizontal.min,
            y: vertical.min,
            w: horizontal.length(),
            h: vertical.length(),
        }
    }

    /// Build a rectangle from its bounds.
    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::from_spans(Span::new(min_x, max_x), Span::new(min_y, max_y))
    }

    pub fn span_x(&self) -> Span {
        Span::new(self.x, self.x + self.w)
    }

    pub fn span_y(&self) -> Span {
        Span::new(self.y, self.y + self.h)
    }

    pub fn norm_x(&self, v: f64) -> f64 {
        self.span_x().normalize(v)
    }

    pub fn norm_y(&self, v: f64) -> f64 {
        self.span_y().normalize(v)
    }

    pub fn lerp_x(&self, t: f64) -> f64 {
        self.span_x().lerp(t)
    }

    pub fn lerp_y(&self, t: f64) -> f64 {
        self.span_y().lerp(t)
    }

    /// Equivalent rectangle with non-negative extents.
    pub fn absolutized(&self) -> Self {
        let (x, w) = if self.w < 0.0 {
            (self.x + self.w, -self.w)
        } else {
            (self.x, self.w)
        };
        let (y, h) = if self.h < 0.0 {
            (self.y + self.h, -self.h)
        } else {
            (self.y, self.h)
        };
        Self { x, y, w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutized_negative_extents() {
        let rect = Rect::new(10.0, 10.0, -5.0, -5.0);
        assert_eq!(rect.absolutized(), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn test_absolutized_positive_is_identity() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(rect.absolutized(), rect);
    }

    #[test]
    fn test_norm_and_lerp() {
        let sensor = Rect::from_bounds(-100.0, 0.0, 100.0, 400.0);
        let window = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        assert_eq!(sensor.norm_x(0.0), 0.5);
        assert_eq!(sensor.norm_y(100.0), 0.25);
        assert_eq!(window.lerp_x(sensor.norm_x(0.0)), 960.0);
        assert_eq!(window.lerp_y(sensor.norm_y(100.0)), 270.0);
    }

    #[test]
    fn test_from_bounds_keeps_sign() {
        let rect = Rect::from_bounds(50.0, 300.0, -50.0, 100.0);
        assert_eq!(rect.w, -100.0);
        assert_eq!(rect.h, -200.0);
        assert_eq!(rect.norm_x(50.0), 0.0);
        assert_eq!(rect.norm_y(100.0), 1.0);
    }
}

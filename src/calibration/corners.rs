//! Corner roles and derivation of the active rectangle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{round_to, Point2D, Rect};

/// Number of guided calibration steps.
pub const CALIBRATION_STEPS: usize = 4;

/// Physical corner registered by a calibration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerRole {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CornerRole {
    /// Presentation order of the steps.
    pub const ORDER: [CornerRole; CALIBRATION_STEPS] = [
        CornerRole::TopLeft,
        CornerRole::TopRight,
        CornerRole::BottomLeft,
        CornerRole::BottomRight,
    ];

    /// Role of step `step`, if it is a valid step index.
    pub fn for_step(step: usize) -> Option<Self> {
        Self::ORDER.get(step).copied()
    }

    pub fn index(self) -> usize {
        match self {
            CornerRole::TopLeft => 0,
            CornerRole::TopRight => 1,
            CornerRole::BottomLeft => 2,
            CornerRole::BottomRight => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CornerRole::TopLeft => "top-left",
            CornerRole::TopRight => "top-right",
            CornerRole::BottomLeft => "bottom-left",
            CornerRole::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for CornerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered corner points, addressed by role.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerSet {
    points: [Option<Point2D>; CALIBRATION_STEPS],
}

impl CornerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, role: CornerRole, point: Point2D) {
        self.points[role.index()] = Some(point);
    }

    pub fn get(&self, role: CornerRole) -> Option<Point2D> {
        self.points[role.index()]
    }

    pub fn count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.count() == CALIBRATION_STEPS
    }

    pub fn clear(&mut self) {
        self.points = [None; CALIBRATION_STEPS];
    }

    /// Derive the active rectangle once every corner is registered.
    pub fn finalize(&self, pad_perc: f64) -> Option<ActiveRectangle> {
        Some(ActiveRectangle::from_corners(
            self.get(CornerRole::TopLeft)?,
            self.get(CornerRole::TopRight)?,
            self.get(CornerRole::BottomLeft)?,
            self.get(CornerRole::BottomRight)?,
            pad_perc,
        ))
    }
}

/// Calibrated sensor-space region mapped onto the interaction surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveRectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ActiveRectangle {
    /// Average opposite edges of the four corners, pad outward by `pad_perc`
    /// of the padded size on each side, and round to one decimal.
    pub fn from_corners(
        top_left: Point2D,
        top_right: Point2D,
        bottom_left: Point2D,
        bottom_right: Point2D,
        pad_perc: f64,
    ) -> Self {
        let avg_left = (top_left.x + bottom_left.x) / 2.0;
        let avg_right = (top_right.x + bottom_right.x) / 2.0;
        let avg_top = (top_left.y + top_right.y) / 2.0;
        let avg_bottom = (bottom_left.y + bottom_right.y) / 2.0;

        let inner = 1.0 - 2.0 * pad_perc;
        let area_w = (avg_right - avg_left) / inner;
        let area_h = (avg_bottom - avg_top) / inner;

        let min_x = avg_left - area_w * pad_perc;
        let min_y = avg_top - area_h * pad_perc;
        let max_x = min_x + area_w;
        let max_y = min_y + area_h;

        Self {
            min_x: round_to(min_x, 1),
            min_y: round_to(min_y, 1),
            max_x: round_to(max_x, 1),
            max_y: round_to(max_y, 1),
        }
    }

    /// Signed rectangle used for normalization.
    pub fn rect(&self) -> Rect {
        Rect::from_bounds(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl fmt::Display for ActiveRectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {:.1}..{:.1}, y: {:.1}..{:.1}",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_corners() -> CornerSet {
        let mut corners = CornerSet::new();
        corners.set(CornerRole::TopLeft, Point2D::new(0.0, 0.0));
        corners.set(CornerRole::TopRight, Point2D::new(100.0, 0.0));
        corners.set(CornerRole::BottomLeft, Point2D::new(0.0, 100.0));
        corners.set(CornerRole::BottomRight, Point2D::new(100.0, 100.0));
        corners
    }

    #[test]
    fn test_finalize_with_padding() {
        let rect = square_corners().finalize(0.1).unwrap();
        assert_eq!(
            rect,
            ActiveRectangle {
                min_x: -12.5,
                min_y: -12.5,
                max_x: 112.5,
                max_y: 112.5,
            }
        );
    }

    #[test]
    fn test_finalize_without_padding_averages_edges() {
        let mut corners = CornerSet::new();
        corners.set(CornerRole::TopLeft, Point2D::new(-10.0, 200.0));
        corners.set(CornerRole::TopRight, Point2D::new(90.0, 210.0));
        corners.set(CornerRole::BottomLeft, Point2D::new(-12.0, 400.0));
        corners.set(CornerRole::BottomRight, Point2D::new(94.0, 390.0));

        let rect = corners.finalize(0.0).unwrap();
        assert_eq!(rect.min_x, -11.0);
        assert_eq!(rect.max_x, 92.0);
        assert_eq!(rect.min_y, 205.0);
        assert_eq!(rect.max_y, 395.0);
    }

    #[test]
    fn test_finalize_rounds_to_one_decimal() {
        let rect = ActiveRectangle::from_corners(
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(10.0, 10.0),
            0.15,
        );
        // area = 10 / 0.7 = 14.2857...
        assert_eq!(rect.min_x, -2.1);
        assert_eq!(rect.max_x, 12.1);
    }

    #[test]
    fn test_finalize_requires_all_corners() {
        let mut corners = square_corners();
        assert!(corners.is_complete());
        corners.clear();
        corners.set(CornerRole::TopLeft, Point2D::new(1.0, 1.0));
        assert_eq!(corners.count(), 1);
        assert!(corners.finalize(0.1).is_none());
    }

    #[test]
    fn test_roles_follow_step_order() {
        assert_eq!(CornerRole::for_step(0), Some(CornerRole::TopLeft));
        assert_eq!(CornerRole::for_step(3), Some(CornerRole::BottomRight));
        assert_eq!(CornerRole::for_step(4), None);
        for (step, role) in CornerRole::ORDER.iter().enumerate() {
            assert_eq!(role.index(), step);
        }
    }
}

//! Live hand markers and the calibrated area in window coordinates.

use serde::{Deserialize, Serialize};

use super::color::{confidence_hue, hsl_to_rgb};
use crate::calibration::ActiveRectangle;
use crate::geometry::{round_to, Rect};
use crate::sensor::{HandSample, SensorZone};

/// A hand positioned on the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandMarker {
    /// Whole-pixel position in window coordinates
    pub x: f64,
    pub y: f64,
    /// Hue in degrees
    pub hue: f64,
    pub color: [u8; 3],
}

/// Map `hands` from `reference` into `window`.
///
/// Hands whose position or hue is not finite are dropped. Positions outside
/// the reference rectangle map outside the window.
pub fn hand_markers(hands: &[HandSample], reference: &Rect, window: &Rect) -> Vec<HandMarker> {
    hands
        .iter()
        .filter_map(|hand| {
            let hue = confidence_hue(hand.confidence);
            let x = window.lerp_x(reference.norm_x(hand.x));
            let y = window.lerp_y(reference.norm_y(hand.y));

            if !(hue.is_finite() && x.is_finite() && y.is_finite()) {
                return None;
            }

            Some(HandMarker {
                x: round_to(x, 0),
                y: round_to(y, 0),
                hue,
                color: hsl_to_rgb(hue, 1.0, 0.5),
            })
        })
        .collect()
}

/// The active rectangle in window coordinates, with positive extents.
///
/// The sensor zone is taken to cover the whole window.
pub fn app_area_rect(zone: &SensorZone, active: &ActiveRectangle, window: &Rect) -> Rect {
    let zone_rect = zone.rect();
    let (zone_x, zone_y) = (zone_rect.span_x(), zone_rect.span_y());
    let (win_x, win_y) = (window.span_x(), window.span_y());

    let x = zone_x.map_to_span(active.min_x, &win_x);
    let y = zone_y.map_to_span(active.min_y, &win_y);
    let right = zone_x.map_to_span(active.max_x, &win_x);
    let bottom = zone_y.map_to_span(active.max_y, &win_y);

    Rect::new(x, y, right - x, bottom - y).absolutized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_markers_map_into_window() {
        let reference = Rect::from_bounds(-100.0, 100.0, 100.0, 300.0);
        let hands = [HandSample::new(0.0, 150.0, 1.0), HandSample::new(100.0, 300.0, 0.0)];

        let markers = hand_markers(&hands, &reference, &window());
        assert_eq!(markers.len(), 2);
        assert_eq!((markers[0].x, markers[0].y), (500.0, 125.0));
        assert_eq!(markers[0].color, [0, 255, 0]);
        assert_eq!((markers[1].x, markers[1].y), (1000.0, 500.0));
        assert_eq!(markers[1].hue, 0.0);
    }

    #[test]
    fn test_markers_round_to_pixels() {
        let reference = Rect::new(0.0, 0.0, 3.0, 3.0);
        let markers = hand_markers(&[HandSample::new(1.0, 2.0, 0.5)], &reference, &window());
        assert_eq!((markers[0].x, markers[0].y), (333.0, 333.0));
    }

    #[test]
    fn test_markers_round_halves_up() {
        let space = Rect::new(0.0, 0.0, 1024.0, 512.0);
        let hands = [HandSample::new(-2.5, 2.5, 0.5), HandSample::new(-3.5, -0.5, 0.5)];
        let markers = hand_markers(&hands, &space, &space);
        assert_eq!((markers[0].x, markers[0].y), (-2.0, 3.0));
        assert_eq!((markers[1].x, markers[1].y), (-3.0, 0.0));
    }

    #[test]
    fn test_markers_skip_non_finite() {
        let degenerate = Rect::new(5.0, 5.0, 0.0, 10.0);
        let markers = hand_markers(&[HandSample::new(6.0, 6.0, 0.5)], &degenerate, &window());
        assert!(markers.is_empty());

        let reference = Rect::new(0.0, 0.0, 10.0, 10.0);
        let markers = hand_markers(&[HandSample::new(5.0, 5.0, f64::NAN)], &reference, &window());
        assert!(markers.is_empty());
    }

    #[test]
    fn test_markers_outside_reference_not_clamped() {
        let reference = Rect::new(0.0, 0.0, 10.0, 10.0);
        let markers = hand_markers(&[HandSample::new(20.0, -5.0, 0.5)], &reference, &window());
        assert_eq!((markers[0].x, markers[0].y), (2000.0, -250.0));
    }

    #[test]
    fn test_app_area_rect() {
        let zone = SensorZone {
            min_x: -200.0,
            min_y: 0.0,
            max_x: 200.0,
            max_y: 400.0,
        };
        let active = ActiveRectangle {
            min_x: -100.0,
            min_y: 100.0,
            max_x: 100.0,
            max_y: 300.0,
        };

        let area = app_area_rect(&zone, &active, &window());
        assert_eq!(area, Rect::new(250.0, 125.0, 500.0, 250.0));
    }

    #[test]
    fn test_app_area_rect_inverted_zone() {
        // Sensor y grows upward while window y grows downward.
        let zone = SensorZone {
            min_x: 0.0,
            min_y: 400.0,
            max_x: 400.0,
            max_y: 0.0,
        };
        let active = ActiveRectangle {
            min_x: 100.0,
            min_y: 100.0,
            max_x: 300.0,
            max_y: 300.0,
        };

        let area = app_area_rect(&zone, &active, &window());
        assert_eq!(area, Rect::new(250.0, 125.0, 500.0, 250.0));
    }
}

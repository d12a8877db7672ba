//! Messages produced by the hand-tracking sensor.

mod replay;

pub use replay::{replay_lines, SensorError};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2D, Rect};

/// One hand detection.
///
/// `confidence` is expected in `[0, 1]` but is never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandSample {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl HandSample {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Hands seen during one sensor tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub hands: Vec<HandSample>,
}

impl Frame {
    pub fn new(hands: Vec<HandSample>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hands_on(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// Native bounding box reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneUpdate {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A message from the sensor collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorEvent {
    Frame {
        #[serde(flatten)]
        frame: Frame,
        /// Offset from the start of a recording, used when replaying.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at_ms: Option<u64>,
    },
    Zone {
        #[serde(flatten)]
        zone: ZoneUpdate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at_ms: Option<u64>,
    },
}

impl SensorEvent {
    pub fn frame(hands: Vec<HandSample>) -> Self {
        SensorEvent::Frame {
            frame: Frame::new(hands),
            at_ms: None,
        }
    }

    pub fn zone(zone: ZoneUpdate) -> Self {
        SensorEvent::Zone { zone, at_ms: None }
    }

    pub fn at_ms(&self) -> Option<u64> {
        match self {
            SensorEvent::Frame { at_ms, .. } | SensorEvent::Zone { at_ms, .. } => *at_ms,
        }
    }
}

/// Sensor-space zone in whole sensor units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorZone {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for SensorZone {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
        }
    }
}

impl SensorZone {
    /// Bounds from a zone update, rounded to whole units.
    pub fn from_update(update: &ZoneUpdate) -> Self {
        Self {
            min_x: round_half_up(update.x_min),
            min_y: round_half_up(update.y_min),
            max_x: round_half_up(update.x_max),
            max_y: round_half_up(update.y_max),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_bounds(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

//! Mapping of sensor-space data onto the display surface.

mod color;
mod markers;

pub use color::{confidence_color, confidence_hue, hsl_to_rgb};
pub use markers::{app_area_rect, hand_markers, HandMarker};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rectangle that hand positions are normalized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceZone {
    /// The sensor's native zone.
    Sensor,
    /// The calibrated active rectangle.
    #[default]
    Calibrated,
}

impl ReferenceZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceZone::Sensor => "sensor",
            ReferenceZone::Calibrated => "calibrated",
        }
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensor" | "leap" => Ok(ReferenceZone::Sensor),
            "calibrated" | "app" => Ok(ReferenceZone::Calibrated),
            other => Err(format!("Unknown reference zone: {}", other)),
        }
    }
}

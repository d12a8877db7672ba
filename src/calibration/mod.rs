//! Calibration of the active rectangle from four registered corners.

mod controller;
mod corners;

pub use controller::{
    CalibrationController, CalibrationEvent, CalibrationPhase, CalibrationProgress,
};
pub use corners::{ActiveRectangle, CornerRole, CornerSet, CALIBRATION_STEPS};

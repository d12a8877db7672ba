//! Guided four-corner calibration.
//!
//! Each step registers one corner: the user clears the sensor, presents a
//! single hand and holds it still for the hold duration. Frames and timer
//! firings are fed in one at a time; timers are requested from a
//! [`DelayScheduler`] so the controller never touches a clock itself.

use serde::{Deserialize, Serialize};

use super::corners::{ActiveRectangle, CornerRole, CornerSet, CALIBRATION_STEPS};
use crate::geometry::Point2D;
use crate::sensor::HandSample;
use crate::settings::CalibrationSettings;
use crate::timer::{DelayScheduler, TimerToken};

/// Coarse calibration state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationPhase {
    /// Calibration has never been started.
    #[default]
    Idle,
    /// Collecting corners.
    Calibrating,
    /// All corners registered.
    Completed(ActiveRectangle),
}

/// Progress snapshot for UI prompting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    pub step: usize,
    pub role: CornerRole,
    /// No hands were seen since the step began, so a hold may start.
    pub ready: bool,
    /// A single hand is currently being registered.
    pub registering: bool,
}

impl CalibrationProgress {
    /// Instruction shown to the user for this step.
    pub fn prompt(&self) -> String {
        if self.ready {
            format!("Point at location #{}", self.step + 1)
        } else {
            "Move hand away from sensor".to_string()
        }
    }
}

/// Notable transitions reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEvent {
    /// The hold moved further than the tolerance and restarted.
    Jitter { step: usize },
    /// More than one hand appeared; the step waits for a clear sensor again.
    Aborted { step: usize },
    /// A corner was registered and the next step began.
    CornerCaptured {
        step: usize,
        role: CornerRole,
        point: Point2D,
    },
    /// The last corner was registered.
    Completed(ActiveRectangle),
}

/// Four-corner calibration state machine.
#[derive(Debug)]
pub struct CalibrationController {
    settings: CalibrationSettings,
    phase: CalibrationPhase,
    step: usize,
    ready: bool,
    registering: bool,
    buffer: Vec<Point2D>,
    corners: CornerSet,
    pending: Option<TimerToken>,
}

impl CalibrationController {
    pub fn new(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            phase: CalibrationPhase::Idle,
            step: 0,
            ready: false,
            registering: false,
            buffer: Vec::new(),
            corners: CornerSet::new(),
            pending: None,
        }
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_calibrating(&self) -> bool {
        self.phase == CalibrationPhase::Calibrating
    }

    /// Current step, or `None` when not calibrating.
    pub fn progress(&self) -> Option<CalibrationProgress> {
        if !self.is_calibrating() {
            return None;
        }
        Some(CalibrationProgress {
            step: self.step,
            role: CornerRole::for_step(self.step)?,
            ready: self.ready,
            registering: self.registering,
        })
    }

    pub fn corners(&self) -> &CornerSet {
        &self.corners
    }

    /// Samples buffered for the current hold.
    pub fn buffered(&self) -> &[Point2D] {
        &self.buffer
    }

    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Begin (or begin again) at the first step, discarding any partial data.
    ///
    /// `hands` is the most recent frame's hands; a sensor that is already
    /// clear makes the first step ready immediately.
    pub fn restart(
        &mut self,
        hands: &[HandSample],
        scheduler: &mut dyn DelayScheduler,
    ) -> Option<CalibrationEvent> {
        self.reset_step(scheduler);
        self.corners.clear();
        self.phase = CalibrationPhase::Calibrating;
        self.step = 0;
        self.ready = hands.is_empty();
        self.registering = false;

        tracing::info!("Calibration started ({} steps)", CALIBRATION_STEPS);

        self.on_frame(hands, scheduler)
    }

    /// Feed the hands of one frame.
    pub fn on_frame(
        &mut self,
        hands: &[HandSample],
        scheduler: &mut dyn DelayScheduler,
    ) -> Option<CalibrationEvent> {
        if !self.is_calibrating() {
            return None;
        }

        if !self.ready {
            if hands.is_empty() {
                self.reset_step(scheduler);
                self.ready = true;
                tracing::debug!("Calibration step {} ready", self.step + 1);
            }
            return None;
        }

        match hands {
            [] => {
                self.registering = false;
                self.reset_step(scheduler);
                None
            }
            [hand] => self.register(hand, scheduler),
            _ => {
                self.reset_step(scheduler);
                self.ready = false;
                self.registering = false;
                tracing::debug!(
                    "Calibration step {} aborted: {} hands present",
                    self.step + 1,
                    hands.len()
                );
                Some(CalibrationEvent::Aborted { step: self.step })
            }
        }
    }

    /// Feed a fired hold timer. Tokens other than the armed one are ignored.
    pub fn on_hold_elapsed(
        &mut self,
        token: TimerToken,
        scheduler: &mut dyn DelayScheduler,
    ) -> Option<CalibrationEvent> {
        if self.pending != Some(token) {
            tracing::debug!("Ignoring stale {}", token);
            return None;
        }
        self.pending = None;

        if !self.is_calibrating() || self.buffer.is_empty() {
            return None;
        }

        let role = CornerRole::for_step(self.step)?;
        let point = mean_point(&self.buffer);
        self.corners.set(role, point);

        tracing::info!(
            "Registered {} corner at ({:.1}, {:.1}) from {} samples",
            role,
            point.x,
            point.y,
            self.buffer.len()
        );

        if self.step + 1 < CALIBRATION_STEPS {
            let step = self.step;
            self.reset_step(scheduler);
            self.step += 1;
            self.ready = false;
            self.registering = false;
            Some(CalibrationEvent::CornerCaptured { step, role, point })
        } else {
            self.complete(scheduler)
        }
    }

    fn register(
        &mut self,
        hand: &HandSample,
        scheduler: &mut dyn DelayScheduler,
    ) -> Option<CalibrationEvent> {
        self.registering = true;
        self.buffer.push(hand.position());

        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule(self.settings.hold()));
        }

        let (width, height) = extent(&self.buffer);
        if width > self.settings.max_move_dist || height > self.settings.max_move_dist {
            tracing::debug!(
                "Calibration step {} jitter ({:.1} x {:.1}), restarting hold",
                self.step + 1,
                width,
                height
            );
            self.reset_step(scheduler);
            return Some(CalibrationEvent::Jitter { step: self.step });
        }

        None
    }

    fn complete(&mut self, scheduler: &mut dyn DelayScheduler) -> Option<CalibrationEvent> {
        self.reset_step(scheduler);
        let rect = self.corners.finalize(self.settings.pad_perc)?;

        self.phase = CalibrationPhase::Completed(rect);
        self.step = CALIBRATION_STEPS;
        self.ready = false;
        self.registering = false;

        tracing::info!("Calibration complete: {}", rect);
        Some(CalibrationEvent::Completed(rect))
    }

    /// Cancel the hold timer and drop buffered samples.
    fn reset_step(&mut self, scheduler: &mut dyn DelayScheduler) {
        if let Some(token) = self.pending.take() {
            scheduler.cancel(token);
        }
        self.buffer.clear();
    }
}

fn mean_point(points: &[Point2D]) -> Point2D {
    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2D::new(sum_x / count, sum_y / count)
}

/// Width and height of the bounding box of `points`.
fn extent(points: &[Point2D]) -> (f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (max_x - min_x, max_y - min_y)
}

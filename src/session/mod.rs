//! Per-frame coordination of calibration, heatmap and sensor zone.

mod runner;

pub use runner::{ControlCommand, SessionError, SessionHandle, SessionRunner, UpdateCallback};

use crate::calibration::{
    ActiveRectangle, CalibrationController, CalibrationEvent, CalibrationPhase,
    CalibrationProgress,
};
use crate::geometry::Rect;
use crate::heatmap::{GridError, HeatmapAggregator, HeatmapGrid};
use crate::sensor::{Frame, HandSample, SensorEvent, SensorZone, ZoneUpdate};
use crate::settings::AppSettings;
use crate::timer::{DelayScheduler, TimerToken};
use crate::view::{hand_markers, HandMarker, ReferenceZone};

/// Something the display layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Calibration(CalibrationEvent),
    /// The current calibration step's prompt state changed.
    Progress(CalibrationProgress),
    /// The sensor reported a new native zone.
    Zone(Rect),
    /// The heatmap was rebuilt.
    Heatmap { history_len: usize },
}

/// State shared by frame delivery and timer firing.
#[derive(Debug)]
pub struct SurfaceSession {
    settings: AppSettings,
    calibration: CalibrationController,
    heatmap: HeatmapAggregator,
    zone: SensorZone,
    active: Option<ActiveRectangle>,
    reference: ReferenceZone,
    hands: Vec<HandSample>,
}

impl SurfaceSession {
    pub fn new(settings: AppSettings) -> Result<Self, GridError> {
        let heatmap = HeatmapAggregator::new(settings.view.heatmap)?;
        Ok(Self {
            calibration: CalibrationController::new(settings.calibration),
            heatmap,
            zone: SensorZone::default(),
            active: None,
            reference: ReferenceZone::default(),
            hands: Vec::new(),
            settings,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Dispatch a sensor message.
    pub fn handle_event(
        &mut self,
        event: SensorEvent,
        scheduler: &mut dyn DelayScheduler,
    ) -> Vec<SessionUpdate> {
        match event {
            SensorEvent::Frame { frame, .. } => self.handle_frame(frame, scheduler),
            SensorEvent::Zone { zone, .. } => vec![self.handle_zone(&zone)],
        }
    }

    /// Calibration first (while calibrating), then the heatmap (while any
    /// hand is present).
    pub fn handle_frame(
        &mut self,
        frame: Frame,
        scheduler: &mut dyn DelayScheduler,
    ) -> Vec<SessionUpdate> {
        self.hands = frame.hands;
        let mut updates = Vec::new();

        if self.calibration.is_calibrating() {
            let before = self.calibration.progress();
            let event = self.calibration.on_frame(&self.hands, scheduler);
            updates.extend(self.calibration_updates(before, event));
        }

        if !self.hands.is_empty() {
            let reference = self.reference_rect();
            self.heatmap.update(&self.hands, reference.as_ref());
            updates.push(SessionUpdate::Heatmap {
                history_len: self.heatmap.history_len(),
            });
        }

        updates
    }

    pub fn handle_zone(&mut self, update: &ZoneUpdate) -> SessionUpdate {
        self.zone = SensorZone::from_update(update);
        tracing::debug!(
            "Sensor zone x: {}..{}, y: {}..{}",
            self.zone.min_x,
            self.zone.max_x,
            self.zone.min_y,
            self.zone.max_y
        );
        SessionUpdate::Zone(self.zone.rect())
    }

    /// Deliver a fired hold timer.
    pub fn handle_hold_elapsed(
        &mut self,
        token: TimerToken,
        scheduler: &mut dyn DelayScheduler,
    ) -> Option<SessionUpdate> {
        self.calibration
            .on_hold_elapsed(token, scheduler)
            .map(|event| self.apply_calibration(event))
    }

    /// Start calibration over from the first corner.
    pub fn restart_calibration(&mut self, scheduler: &mut dyn DelayScheduler) -> Vec<SessionUpdate> {
        self.reference = ReferenceZone::Calibrated;
        let event = self.calibration.restart(&self.hands, scheduler);
        self.calibration_updates(None, event)
    }

    /// The event, if any, followed by the progress if it changed from `before`.
    fn calibration_updates(
        &mut self,
        before: Option<CalibrationProgress>,
        event: Option<CalibrationEvent>,
    ) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        if let Some(event) = event {
            updates.push(self.apply_calibration(event));
        }
        let after = self.calibration.progress();
        if after != before {
            if let Some(progress) = after {
                updates.push(SessionUpdate::Progress(progress));
            }
        }
        updates
    }

    fn apply_calibration(&mut self, event: CalibrationEvent) -> SessionUpdate {
        if let CalibrationEvent::Completed(rect) = event {
            self.active = Some(rect);
            self.reference = ReferenceZone::Calibrated;
        }
        SessionUpdate::Calibration(event)
    }

    /// Select the rectangle hands are normalized against.
    pub fn set_reference(&mut self, reference: ReferenceZone) {
        self.reference = reference;
        let rect = self.reference_rect();
        self.heatmap.rebuild(rect.as_ref());
    }

    pub fn reference(&self) -> ReferenceZone {
        self.reference
    }

    /// The selected reference rectangle, if it exists yet.
    pub fn reference_rect(&self) -> Option<Rect> {
        match self.reference {
            ReferenceZone::Sensor => Some(self.zone.rect()),
            ReferenceZone::Calibrated => self.active.map(|rect| rect.rect()),
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.calibration.phase()
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_calibrating()
    }

    pub fn progress(&self) -> Option<CalibrationProgress> {
        self.calibration.progress()
    }

    /// Instruction for the user while calibrating.
    pub fn prompt(&self) -> Option<String> {
        self.progress().map(|progress| progress.prompt())
    }

    pub fn active_rect(&self) -> Option<ActiveRectangle> {
        self.active
    }

    pub fn zone(&self) -> SensorZone {
        self.zone
    }

    pub fn hands(&self) -> &[HandSample] {
        &self.hands
    }

    pub fn hands_on(&self) -> bool {
        !self.hands.is_empty()
    }

    pub fn heatmap(&self) -> &HeatmapGrid {
        self.heatmap.grid()
    }

    pub fn history_len(&self) -> usize {
        self.heatmap.history_len()
    }

    /// Current hands positioned in `window`.
    pub fn markers(&self, window: &Rect) -> Vec<HandMarker> {
        match self.reference_rect() {
            Some(reference) => hand_markers(&self.hands, &reference, window),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CornerRole;
    use crate::settings::{CalibrationSettings, HeatmapSettings};
    use crate::timer::ManualScheduler;
    use std::time::Duration;

    fn settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.calibration = CalibrationSettings::default()
            .with_hold_duration(0.5)
            .with_max_move_dist(5.0)
            .with_pad_perc(0.1);
        settings.view.heatmap = HeatmapSettings {
            rows: 4,
            cols: 4,
            max_history: 100,
        };
        settings
    }

    fn frame(hands: &[(f64, f64)]) -> Frame {
        Frame::new(hands.iter().map(|&(x, y)| HandSample::new(x, y, 0.5)).collect())
    }

    fn fire_due(
        session: &mut SurfaceSession,
        scheduler: &mut ManualScheduler,
        by: Duration,
    ) -> Vec<SessionUpdate> {
        scheduler
            .advance(by)
            .into_iter()
            .filter_map(|token| session.handle_hold_elapsed(token, scheduler))
            .collect()
    }

    #[test]
    fn test_frames_without_hands_skip_heatmap() {
        let mut session = SurfaceSession::new(settings()).unwrap();
        let mut scheduler = ManualScheduler::new();

        let updates = session.handle_frame(Frame::empty(), &mut scheduler);
        assert!(updates.is_empty());
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_heatmap_uses_selected_reference() {
        let mut session = SurfaceSession::new(settings()).unwrap();
        let mut scheduler = ManualScheduler::new();

        session.handle_zone(&ZoneUpdate {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 100.0,
            y_max: 100.0,
        });

        // No calibration yet: history grows, nothing binned.
        let updates = session.handle_frame(frame(&[(10.0, 10.0)]), &mut scheduler);
        assert_eq!(updates, vec![SessionUpdate::Heatmap { history_len: 1 }]);
        assert_eq!(session.heatmap().filled_cells(), 0);
        assert!(session.markers(&Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());

        session.set_reference(ReferenceZone::Sensor);
        assert_eq!(session.heatmap().mean(0, 0), Some(0.5));
        let markers = session.markers(&Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!((markers[0].x, markers[0].y), (20.0, 20.0));
    }

    #[test]
    fn test_full_calibration_switches_to_active_rect() {
        let mut session = SurfaceSession::new(settings()).unwrap();
        let mut scheduler = ManualScheduler::new();

        session.set_reference(ReferenceZone::Sensor);
        session.handle_frame(frame(&[(1.0, 1.0)]), &mut scheduler);
        let updates = session.restart_calibration(&mut scheduler);
        assert_eq!(updates.len(), 1);
        assert_eq!(session.reference(), ReferenceZone::Calibrated);
        assert_eq!(session.prompt().as_deref(), Some("Move hand away from sensor"));

        let corners = [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)];
        let mut completed = None;
        for (i, corner) in corners.iter().enumerate() {
            let updates = session.handle_frame(Frame::empty(), &mut scheduler);
            assert!(matches!(
                updates.as_slice(),
                [SessionUpdate::Progress(CalibrationProgress { ready: true, .. })]
            ));
            assert_eq!(
                session.progress().map(|p| p.role),
                CornerRole::for_step(i)
            );
            assert_eq!(
                session.prompt(),
                Some(format!("Point at location #{}", i + 1))
            );

            let updates = session.handle_frame(frame(&[*corner]), &mut scheduler);
            assert!(matches!(
                updates[0],
                SessionUpdate::Progress(CalibrationProgress {
                    registering: true,
                    ..
                })
            ));
            assert!(matches!(updates[1], SessionUpdate::Heatmap { .. }));

            for update in fire_due(&mut session, &mut scheduler, Duration::from_millis(500)) {
                if let SessionUpdate::Calibration(CalibrationEvent::Completed(rect)) = update {
                    completed = Some(rect);
                }
            }
        }

        let rect = completed.expect("calibration should complete");
        assert_eq!(session.active_rect(), Some(rect));
        assert_eq!(rect.min_x, -12.5);
        assert_eq!(rect.max_y, 112.5);
        assert!(!session.is_calibrating());
        assert_eq!(session.prompt(), None);

        // Heatmap samples now bin against the active rectangle.
        session.handle_frame(frame(&[(50.0, 50.0)]), &mut scheduler);
        assert_eq!(session.heatmap().mean(2, 2), Some(0.5));
    }

    #[test]
    fn test_two_hands_abort_calibration_step() {
        let mut session = SurfaceSession::new(settings()).unwrap();
        let mut scheduler = ManualScheduler::new();

        session.restart_calibration(&mut scheduler);
        session.handle_frame(frame(&[(1.0, 1.0)]), &mut scheduler);
        let updates = session.handle_frame(frame(&[(1.0, 1.0), (9.0, 9.0)]), &mut scheduler);

        assert_eq!(
            updates[0],
            SessionUpdate::Calibration(CalibrationEvent::Aborted { step: 0 })
        );
        assert!(matches!(
            updates[1],
            SessionUpdate::Progress(CalibrationProgress { ready: false, .. })
        ));
        assert_eq!(updates[2], SessionUpdate::Heatmap { history_len: 3 });
        assert!(fire_due(&mut session, &mut scheduler, Duration::from_secs(1)).is_empty());
        assert_eq!(session.progress().unwrap().step, 0);
    }
}

//! Async event loop driving a [`SurfaceSession`].
//!
//! Sensor events, control commands and hold timers are all consumed by one
//! task, so the session is only ever touched by one message at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{SessionUpdate, SurfaceSession};
use crate::sensor::SensorEvent;
use crate::timer::TokioScheduler;
use crate::view::ReferenceZone;

/// Errors from the session handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session channel closed")]
    ChannelClosed,
}

/// Control commands for the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    RestartCalibration,
    SetReference(ReferenceZone),
    Stop,
}

/// Callback for session updates.
pub type UpdateCallback = Box<dyn Fn(&SessionUpdate, &SurfaceSession) + Send + Sync>;

/// Handle for feeding the session loop from outside.
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<SensorEvent>,
    control_tx: mpsc::Sender<ControlCommand>,
    running: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Deliver a sensor event.
    pub async fn send_event(&self, event: SensorEvent) -> Result<(), SessionError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Sender for sensor events, e.g. for a replay task.
    pub fn event_sender(&self) -> mpsc::Sender<SensorEvent> {
        self.event_tx.clone()
    }

    pub async fn restart_calibration(&self) -> Result<(), SessionError> {
        self.send_control(ControlCommand::RestartCalibration).await
    }

    pub async fn set_reference(&self, reference: ReferenceZone) -> Result<(), SessionError> {
        self.send_control(ControlCommand::SetReference(reference))
            .await
    }

    /// Stop the loop.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.running.store(false, Ordering::SeqCst);
        self.send_control(ControlCommand::Stop).await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn send_control(&self, command: ControlCommand) -> Result<(), SessionError> {
        self.control_tx
            .send(command)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }
}

/// Owns a session and runs it on a tokio task.
pub struct SessionRunner {
    session: SurfaceSession,
    update_callback: Option<UpdateCallback>,
    event_capacity: usize,
}

impl SessionRunner {
    pub fn new(session: SurfaceSession) -> Self {
        Self {
            session,
            update_callback: None,
            event_capacity: 256,
        }
    }

    /// Set a callback invoked for every session update.
    pub fn with_update_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SessionUpdate, &SurfaceSession) + Send + Sync + 'static,
    {
        self.update_callback = Some(Box::new(callback));
        self
    }

    /// Set the sensor event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Spawn the loop.
    ///
    /// The loop ends on [`ControlCommand::Stop`] or once every event sender
    /// is dropped; the task then yields the session back.
    pub fn run(self) -> (SessionHandle, JoinHandle<SurfaceSession>) {
        let (event_tx, mut event_rx) = mpsc::channel::<SensorEvent>(self.event_capacity);
        let (control_tx, mut control_rx) = mpsc::channel::<ControlCommand>(16);
        let running = Arc::new(AtomicBool::new(true));

        let handle = SessionHandle {
            event_tx,
            control_tx,
            running: running.clone(),
        };

        let SessionRunner {
            mut session,
            update_callback,
            ..
        } = self;

        let task = tokio::spawn(async move {
            let (mut scheduler, mut fired_rx) = TokioScheduler::new();
            let notify = |update: &SessionUpdate, session: &SurfaceSession| {
                if let Some(ref callback) = update_callback {
                    callback(update, session);
                }
            };

            tracing::info!("Session loop started");

            loop {
                tokio::select! {
                    biased;

                    Some(command) = control_rx.recv() => {
                        match command {
                            ControlCommand::RestartCalibration => {
                                for update in session.restart_calibration(&mut scheduler) {
                                    notify(&update, &session);
                                }
                            }
                            ControlCommand::SetReference(reference) => {
                                tracing::info!("Reference zone: {}", reference);
                                session.set_reference(reference);
                            }
                            ControlCommand::Stop => {
                                tracing::info!("Session loop stopping...");
                                break;
                            }
                        }
                    }

                    Some(token) = fired_rx.recv() => {
                        if !scheduler.acknowledge(token) {
                            continue;
                        }
                        if let Some(update) = session.handle_hold_elapsed(token, &mut scheduler) {
                            notify(&update, &session);
                        }
                    }

                    event = event_rx.recv() => {
                        let Some(event) = event else {
                            tracing::info!("Sensor stream ended");
                            break;
                        };
                        for update in session.handle_event(event, &mut scheduler) {
                            notify(&update, &session);
                        }
                    }
                }

                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }

            running.store(false, Ordering::SeqCst);
            tracing::info!("Session loop stopped");
            session
        });

        (handle, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationEvent, CalibrationPhase};
    use crate::sensor::HandSample;
    use crate::settings::{AppSettings, CalibrationSettings};
    use std::sync::Mutex;
    use std::time::Duration;

    fn settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.calibration = CalibrationSettings::default()
            .with_hold_duration(0.03)
            .with_max_move_dist(5.0)
            .with_pad_perc(0.1);
        settings
    }

    #[tokio::test]
    async fn test_runner_completes_calibration() {
        let session = SurfaceSession::new(settings()).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = events.clone();

        let runner = SessionRunner::new(session).with_update_callback(move |update, _| {
            if let SessionUpdate::Calibration(event) = update {
                seen.lock().unwrap().push(*event);
            }
        });
        let (handle, task) = runner.run();

        handle.restart_calibration().await.unwrap();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)] {
            handle.send_event(SensorEvent::frame(Vec::new())).await.unwrap();
            handle
                .send_event(SensorEvent::frame(vec![HandSample::new(x, y, 1.0)]))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(80)).await;
        }

        drop(handle);
        let session = task.await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[3], CalibrationEvent::Completed(_)));
        match session.phase() {
            CalibrationPhase::Completed(rect) => {
                assert_eq!(rect.min_x, -12.5);
                assert_eq!(rect.max_x, 112.5);
            }
            other => panic!("unexpected phase: {:?}", other),
        }
        assert_eq!(session.history_len(), 4);
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        let session = SurfaceSession::new(settings()).unwrap();
        let (handle, task) = SessionRunner::new(session).run();

        assert!(handle.is_running());
        handle.stop().await.unwrap();
        task.await.unwrap();
        assert!(!handle.is_running());
        assert_eq!(
            handle.send_event(SensorEvent::frame(Vec::new())).await,
            Err(SessionError::ChannelClosed)
        );
    }
}

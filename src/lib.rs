// Copyright 2025 The hand-surface authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Hand Surface
//!
//! Turns a 3D hand-tracking sensor's position stream into a 2D interaction
//! surface.
//!
//! - A guided four-corner calibration derives the *active rectangle*, the
//!   region of sensor space that corresponds to the physical interaction zone.
//! - Live hand positions are mapped through that rectangle onto the display.
//! - A rolling heatmap records the mean detection confidence per grid cell.
//!
//! ## Driving a session directly
//!
//! ```rust
//! use hand_surface::{AppSettings, HandSample, ManualScheduler, SensorEvent, SurfaceSession};
//! use std::time::Duration;
//!
//! let settings = AppSettings::default();
//! let hold = settings.calibration.hold();
//! let mut session = SurfaceSession::new(settings).unwrap();
//! let mut scheduler = ManualScheduler::new();
//!
//! session.restart_calibration(&mut scheduler);
//! session.handle_event(SensorEvent::frame(vec![HandSample::new(-120.0, 380.0, 0.9)]), &mut scheduler);
//!
//! for token in scheduler.advance(hold) {
//!     session.handle_hold_elapsed(token, &mut scheduler);
//! }
//! assert_eq!(session.progress().unwrap().step, 1);
//! ```
//!
//! ## Async loop
//!
//! ```rust,no_run
//! use hand_surface::{AppSettings, SessionRunner, SurfaceSession, replay_lines};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = SurfaceSession::new(AppSettings::load()?)?;
//!     let (handle, task) = SessionRunner::new(session)
//!         .with_update_callback(|update, _| println!("{:?}", update))
//!         .run();
//!
//!     handle.restart_calibration().await?;
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     replay_lines(stdin, handle.event_sender()).await?;
//!     drop(handle);
//!
//!     let session = task.await?;
//!     println!("Active rectangle: {:?}", session.active_rect());
//!     Ok(())
//! }
//! ```

pub mod calibration;
pub mod geometry;
pub mod heatmap;
pub mod sensor;
pub mod session;
pub mod settings;
pub mod timer;
pub mod view;

pub use calibration::{
    ActiveRectangle, CalibrationController, CalibrationEvent, CalibrationPhase,
    CalibrationProgress, CornerRole,
};
pub use geometry::{Point2D, Rect, Span};
pub use heatmap::{HeatmapAggregator, HeatmapCell, HeatmapGrid};
pub use sensor::{replay_lines, Frame, HandSample, SensorEvent, SensorZone, ZoneUpdate};
pub use session::{SessionHandle, SessionRunner, SessionUpdate, SurfaceSession};
pub use settings::{AppSettings, MAX_HISTORY};
pub use timer::{DelayScheduler, ManualScheduler, TimerToken, TokioScheduler};
pub use view::ReferenceZone;

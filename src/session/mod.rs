// CalibrationSession - one end-to-end calibration interaction
//
// The session owns the calibrator, the target layout and the lifecycle
// Idle -> Running -> {Finished, Aborted}. It is driven one event at a time by
// the surrounding event loop (clicks, geometry changes, timer ticks, focus
// loss) and reports the result exactly once through the finish callback.

pub mod progress;

use std::time::Duration;

use crate::calibration::{
    AxisCalibration, CalibrationState, Calibrator, ClickPoint, ClickVerdict, Geometry,
    TargetLayout, Thresholds,
};
use crate::error::{log_calibration_error, CalibrationError};

pub use progress::{
    AbortReason, CalibrationProgress, ClickOutcome, SessionOutcome, SessionState,
};

/// Default time without clicks before the session gives up
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Receives the session result; invoked at most once
pub type FinishCallback = Box<dyn FnOnce(SessionOutcome) + Send>;

/// Invoked whenever a misclick restarts the calibration
pub type MisclickHook = Box<dyn FnMut() + Send>;

/// Active calibrator plus the targets computed for its geometry
struct Run {
    calibrator: Calibrator,
    layout: TargetLayout,
}

pub struct CalibrationSession {
    state: SessionState,
    run: Option<Run>,
    /// Only clicks from this device are accepted, when set
    device: Option<u32>,
    timeout: Duration,
    idle: Duration,
    last_misclick: bool,
    on_finish: Option<FinishCallback>,
    on_misclick: Option<MisclickHook>,
    outcome: Option<SessionOutcome>,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            run: None,
            device: None,
            timeout: DEFAULT_TIMEOUT,
            idle: Duration::ZERO,
            last_misclick: false,
            on_finish: None,
            on_misclick: None,
            outcome: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restrict input to one device id
    pub fn with_device(mut self, device: u32) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_misclick_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_misclick = Some(Box::new(hook));
        self
    }

    /// Begin calibrating
    ///
    /// # Arguments
    /// * `geometry` - Display area being calibrated
    /// * `thresholds` - Double-click and misclick thresholds
    /// * `on_finish` - Called once with the result or the abort reason
    ///
    /// # Errors
    /// `AlreadyInProgress` unless the session is still idle.
    pub fn start<F>(
        &mut self,
        geometry: Geometry,
        thresholds: Thresholds,
        on_finish: F,
    ) -> Result<(), CalibrationError>
    where
        F: FnOnce(SessionOutcome) + Send + 'static,
    {
        if self.state != SessionState::Idle {
            let err = CalibrationError::AlreadyInProgress;
            log_calibration_error(&err, "start_session");
            return Err(err);
        }

        self.run = Some(Run {
            calibrator: Calibrator::new(geometry, thresholds),
            layout: TargetLayout::from_geometry(geometry),
        });
        self.on_finish = Some(Box::new(on_finish));
        self.idle = Duration::ZERO;
        self.state = SessionState::Running;

        tracing::info!(
            "[CalibrationSession] Started on {}x{} (doubleclick={}, misclick={}, timeout={:?})",
            geometry.width,
            geometry.height,
            thresholds.doubleclick,
            thresholds.misclick,
            self.timeout
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Which of the four markers to highlight
    pub fn current_target_index(&self) -> CalibrationState {
        self.run
            .as_ref()
            .map(|run| run.calibrator.state())
            .unwrap_or_default()
    }

    /// Screen position of the marker to highlight, while running
    pub fn current_target(&self) -> Option<ClickPoint> {
        if self.state != SessionState::Running {
            return None;
        }
        self.run
            .as_ref()
            .and_then(|run| run.layout.get(run.calibrator.state()))
    }

    /// Forward a click from any device
    pub fn submit_click(&mut self, x: i32, y: i32) -> ClickOutcome {
        if self.state != SessionState::Running {
            tracing::debug!(
                "[CalibrationSession] Ignoring click ({}, {}) in state {:?}",
                x,
                y,
                self.state
            );
            return ClickOutcome::Ignored;
        }

        self.idle = Duration::ZERO;

        let Some(run) = self.run.as_mut() else {
            return ClickOutcome::Ignored;
        };

        let verdict = match run.calibrator.process_click(ClickPoint::new(x, y)) {
            Ok(verdict) => verdict,
            Err(err) => {
                log_calibration_error(&err, "submit_click");
                return ClickOutcome::Ignored;
            }
        };

        self.last_misclick = verdict == ClickVerdict::Misclick;

        match verdict {
            ClickVerdict::DoubleClick => ClickOutcome::DoubleClick,
            ClickVerdict::Misclick => {
                let restart_target = run.layout.points()[0];
                tracing::info!("[CalibrationSession] Misclick detected, restarting...");
                if let Some(hook) = self.on_misclick.as_mut() {
                    hook();
                }
                ClickOutcome::Misclick { restart_target }
            }
            ClickVerdict::Accepted => {
                let next_target = run.calibrator.state();
                match run.layout.get(next_target) {
                    Some(position) => ClickOutcome::Accepted {
                        next_target,
                        position,
                    },
                    None => match run.calibrator.finish() {
                        Ok(axis) => {
                            self.complete(axis);
                            ClickOutcome::Completed(axis)
                        }
                        Err(err) => {
                            log_calibration_error(&err, "submit_click");
                            self.terminate(AbortReason::Incomplete);
                            ClickOutcome::Ignored
                        }
                    },
                }
            }
        }
    }

    /// Forward a click tagged with the device that produced it
    ///
    /// Clicks from other devices are ignored when a device filter is set.
    pub fn submit_device_click(&mut self, device: u32, x: i32, y: i32) -> ClickOutcome {
        if let Some(expected) = self.device {
            if expected != device {
                tracing::debug!(
                    "[CalibrationSession] Ignoring input from device {} (calibrating {})",
                    device,
                    expected
                );
                return ClickOutcome::Ignored;
            }
        }
        self.submit_click(x, y)
    }

    /// Apply a new display geometry
    ///
    /// Recomputes the targets; a changed geometry restarts the calibration.
    /// Returns the target to re-show, if the session is running. A session
    /// that is idle or already ended keeps its state.
    pub fn update_geometry(&mut self, geometry: Geometry) -> Option<ClickPoint> {
        if self.state != SessionState::Running {
            return None;
        }
        let run = self.run.as_mut()?;
        run.calibrator.update_geometry(geometry);
        run.layout = TargetLayout::from_geometry(geometry);
        self.current_target()
    }

    /// Advance the timeout clock
    ///
    /// Returns `true` if this tick timed the session out.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if self.state != SessionState::Running {
            return false;
        }

        self.idle += elapsed;
        if self.idle > self.timeout {
            tracing::info!(
                "[CalibrationSession] No click for {:?}, giving up",
                self.idle
            );
            self.terminate(AbortReason::TimedOut);
            return true;
        }
        false
    }

    /// Cancel the session; no effect unless running
    pub fn abort(&mut self) {
        self.abort_with(AbortReason::Cancelled);
    }

    /// The calibration window lost focus
    pub fn focus_lost(&mut self) {
        self.abort_with(AbortReason::FocusLost);
    }

    /// Abort with an explicit reason
    ///
    /// Only a running session aborts. An idle session stays startable and an
    /// ended one keeps its outcome.
    pub fn abort_with(&mut self, reason: AbortReason) {
        if self.state != SessionState::Running {
            return;
        }
        tracing::info!("[CalibrationSession] Aborted: {}", reason);
        self.terminate(reason);
    }

    /// Result of the session once it reached a terminal state
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn progress(&self) -> CalibrationProgress {
        let clicks_collected = self
            .run
            .as_ref()
            .map(|run| run.calibrator.num_clicks())
            .unwrap_or(0) as u8;

        CalibrationProgress {
            session_state: self.state,
            target: self.current_target_index(),
            target_position: self.current_target(),
            clicks_collected,
            clicks_needed: CalibrationState::TARGET_COUNT as u8,
            misclick: self.last_misclick,
        }
    }

    fn complete(&mut self, axis: AxisCalibration) {
        self.state = SessionState::Finished;
        self.report(Ok(axis));
    }

    fn terminate(&mut self, reason: AbortReason) {
        self.state = SessionState::Aborted;
        self.report(Err(reason));
    }

    fn report(&mut self, outcome: SessionOutcome) {
        self.outcome = Some(outcome);
        if let Some(on_finish) = self.on_finish.take() {
            on_finish(outcome);
        }
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

// Progress and outcome types for a calibration session
//
// These are the values handed to the rendering side: which target to
// highlight, whether to show the "misclick, restarting" notice, and how the
// session ended.

use std::fmt;

use crate::calibration::{AxisCalibration, CalibrationState, ClickPoint};

/// Lifecycle of one calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
    Aborted,
}

impl SessionState {
    /// Whether the session reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Aborted)
    }
}

/// Why a session ended without a calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AbortReason {
    /// Explicit cancellation (escape key, window closed)
    Cancelled,
    /// Calibration window lost focus
    FocusLost,
    /// No click arrived before the timeout elapsed
    TimedOut,
    /// Calibrator could not produce a result
    Incomplete,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            AbortReason::Cancelled => "cancelled",
            AbortReason::FocusLost => "focus lost",
            AbortReason::TimedOut => "timed out",
            AbortReason::Incomplete => "incomplete",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for AbortReason {}

/// Result reported exactly once through the finish callback
pub type SessionOutcome = Result<AxisCalibration, AbortReason>;

/// Effect of a single click on the session
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ClickOutcome {
    /// Click accepted, `position` is the next target to render
    Accepted {
        next_target: CalibrationState,
        position: ClickPoint,
    },
    /// Fourth click accepted and the calibration computed
    Completed(AxisCalibration),
    /// Alignment failed, calibration restarts at `restart_target`
    Misclick { restart_target: ClickPoint },
    /// Duplicate tap, nothing changed
    DoubleClick,
    /// Session not running, or click came from another device
    Ignored,
}

/// Snapshot of session progress for rendering and broadcast
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationProgress {
    pub session_state: SessionState,
    /// Target to highlight
    pub target: CalibrationState,
    /// Screen position of that target, `None` when no target is shown
    pub target_position: Option<ClickPoint>,
    pub clicks_collected: u8,
    pub clicks_needed: u8,
    /// Last click triggered a restart; show the transient notice
    pub misclick: bool,
}

impl CalibrationProgress {
    /// Get progress percentage (0-100)
    pub fn percentage(&self) -> u8 {
        if self.clicks_needed == 0 {
            return 0;
        }
        ((self.clicks_collected as f32 / self.clicks_needed as f32) * 100.0) as u8
    }

    /// Check if all targets have been collected
    pub fn is_calibration_complete(&self) -> bool {
        self.clicks_collected >= self.clicks_needed
    }
}

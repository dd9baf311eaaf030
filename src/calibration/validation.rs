// Click validation logic for calibration
//
// Two independent checks run on every incoming click:
// - double-click rejection against every previously accepted point
// - axis-alignment (misclick) validation against the corner points already
//   collected in this run

use crate::calibration::geometry::{ClickPoint, Thresholds};
use crate::calibration::state::CalibrationState;

/// Result of validating a single click
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClickVerdict {
    /// Click stored, state advanced
    Accepted,
    /// Duplicate of an accepted point, ignored without state change
    DoubleClick,
    /// Alignment check failed, calibration restarted from the first corner
    Misclick,
}

/// Validator for calibration clicks
pub struct ClickValidator;

impl ClickValidator {
    /// Validate a click against the points accepted so far
    ///
    /// # Arguments
    /// * `state` - Corner the click is expected for
    /// * `point` - Incoming click
    /// * `accepted` - Points stored so far, indexed by state
    /// * `thresholds` - Pixel thresholds (0 disables a check)
    ///
    /// Double-click rejection takes precedence over misclick detection.
    pub fn validate(
        state: CalibrationState,
        point: ClickPoint,
        accepted: &[Option<ClickPoint>; CalibrationState::TARGET_COUNT],
        thresholds: Thresholds,
    ) -> ClickVerdict {
        if Self::is_doubleclick(point, accepted, thresholds.doubleclick) {
            return ClickVerdict::DoubleClick;
        }

        if !Self::is_aligned(state, point, accepted, thresholds.misclick) {
            return ClickVerdict::Misclick;
        }

        ClickVerdict::Accepted
    }

    /// True when `point` repeats any accepted point within `threshold` on both axes
    pub fn is_doubleclick(
        point: ClickPoint,
        accepted: &[Option<ClickPoint>; CalibrationState::TARGET_COUNT],
        threshold: u32,
    ) -> bool {
        if threshold == 0 {
            return false;
        }

        accepted
            .iter()
            .flatten()
            .any(|prior| prior.is_near(&point, threshold))
    }

    /// Check the axis-alignment relationship expected for `state`
    ///
    /// * UpperRight: horizontally aligned with UpperLeft
    /// * LowerLeft: vertically aligned with UpperLeft
    /// * LowerRight: vertically aligned with UpperRight and horizontally
    ///   aligned with LowerLeft
    pub fn is_aligned(
        state: CalibrationState,
        point: ClickPoint,
        accepted: &[Option<ClickPoint>; CalibrationState::TARGET_COUNT],
        threshold: u32,
    ) -> bool {
        if threshold == 0 {
            return true;
        }

        let slot = |s: CalibrationState| s.index().and_then(|idx| accepted[idx]);

        match state {
            CalibrationState::UpperLeft => true,
            CalibrationState::UpperRight => slot(CalibrationState::UpperLeft)
                .is_some_and(|ul| Self::along_x_axis(point, ul, threshold)),
            CalibrationState::LowerLeft => slot(CalibrationState::UpperLeft)
                .is_some_and(|ul| Self::along_y_axis(point, ul, threshold)),
            CalibrationState::LowerRight => {
                let below_ur = slot(CalibrationState::UpperRight)
                    .is_some_and(|ur| Self::along_y_axis(point, ur, threshold));
                let right_of_ll = slot(CalibrationState::LowerLeft)
                    .is_some_and(|ll| Self::along_x_axis(point, ll, threshold));
                below_ur && right_of_ll
            }
            CalibrationState::Complete => false,
        }
    }

    /// Same row as `reference` (within threshold) and to its right
    fn along_x_axis(point: ClickPoint, reference: ClickPoint, threshold: u32) -> bool {
        point.y.abs_diff(reference.y) <= threshold && point.x > reference.x
    }

    /// Same column as `reference` (within threshold) and below it
    fn along_y_axis(point: ClickPoint, reference: ClickPoint, threshold: u32) -> bool {
        point.x.abs_diff(reference.x) <= threshold && point.y > reference.y
    }
}

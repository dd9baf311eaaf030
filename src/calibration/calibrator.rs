// Calibrator - click collection state machine and transform computation
//
// The calibrator accepts clicks for four corner targets in a fixed order:
// 1. Upper left
// 2. Upper right
// 3. Lower left
// 4. Lower right
//
// Each click is validated before acceptance. A duplicate tap is ignored; a
// misaligned tap discards all progress and restarts at the upper left corner.
// Once four clicks are stored, `finish` turns them into a normalized
// AxisCalibration.

use crate::calibration::axis::AxisCalibration;
use crate::calibration::geometry::{ClickPoint, Geometry, Thresholds, NUM_BLOCKS};
use crate::calibration::state::CalibrationState;
use crate::calibration::validation::{ClickValidator, ClickVerdict};
use crate::error::{log_calibration_error, CalibrationError};

/// Calibrator manages the four-click collection workflow
#[derive(Debug, Clone)]
pub struct Calibrator {
    /// Accepted points, indexed by the state they were collected in
    points: [Option<ClickPoint>; CalibrationState::TARGET_COUNT],
    /// Corner expected next
    state: CalibrationState,
    geometry: Geometry,
    thresholds: Thresholds,
}

impl Calibrator {
    /// Create a calibrator for the given display geometry
    ///
    /// # Arguments
    /// * `geometry` - Display area being calibrated
    /// * `thresholds` - Double-click and misclick thresholds in pixels
    pub fn new(geometry: Geometry, thresholds: Thresholds) -> Self {
        Self {
            points: [None; CalibrationState::TARGET_COUNT],
            state: CalibrationState::UpperLeft,
            geometry,
            thresholds,
        }
    }

    /// Replace the display geometry
    ///
    /// A changed geometry moves every target, so any partial calibration is
    /// discarded. An identical geometry is a no-op.
    pub fn update_geometry(&mut self, geometry: Geometry) {
        if geometry == self.geometry {
            return;
        }

        log::debug!(
            "[Calibrator] Geometry changed {}x{} -> {}x{}, restarting",
            self.geometry.width,
            self.geometry.height,
            geometry.width,
            geometry.height
        );
        self.geometry = geometry;
        self.reset();
    }

    /// Restart from the upper left corner, discarding accepted points
    ///
    /// Geometry and thresholds are kept.
    pub fn reset(&mut self) {
        self.points = [None; CalibrationState::TARGET_COUNT];
        self.state = CalibrationState::UpperLeft;
    }

    /// Add a click for the current corner
    ///
    /// # Returns
    /// `true` if the click was accepted and advanced the state machine,
    /// `false` if it was ignored as a double-click or triggered a misclick
    /// reset.
    ///
    /// # Panics
    /// When called after calibration is complete. Check `state()` first.
    pub fn add_click(&mut self, x: i32, y: i32) -> bool {
        assert!(
            !self.state.is_complete(),
            "add_click called on a complete calibration"
        );

        matches!(
            self.process_click(ClickPoint::new(x, y)),
            Ok(ClickVerdict::Accepted)
        )
    }

    /// Validate a click and apply its effect on the state machine
    ///
    /// # Returns
    /// * `Ok(ClickVerdict::Accepted)` - Point stored, state advanced
    /// * `Ok(ClickVerdict::DoubleClick)` - Ignored, nothing changed
    /// * `Ok(ClickVerdict::Misclick)` - All progress discarded
    /// * `Err(CalibrationError::AlreadyComplete)` - Four points already stored
    pub fn process_click(&mut self, point: ClickPoint) -> Result<ClickVerdict, CalibrationError> {
        let Some(slot) = self.state.index() else {
            let err = CalibrationError::AlreadyComplete;
            log_calibration_error(&err, "process_click");
            return Err(err);
        };

        let verdict = ClickValidator::validate(self.state, point, &self.points, self.thresholds);

        match verdict {
            ClickVerdict::Accepted => {
                self.points[slot] = Some(point);
                self.state = self.state.next().unwrap_or(CalibrationState::Complete);
                log::debug!(
                    "[Calibrator] Accepted ({}, {}), next: {}",
                    point.x,
                    point.y,
                    self.state.display_name()
                );
            }
            ClickVerdict::DoubleClick => {
                log::debug!(
                    "[Calibrator] Ignoring double click at ({}, {})",
                    point.x,
                    point.y
                );
            }
            ClickVerdict::Misclick => {
                log::info!(
                    "[Calibrator] Misclick at ({}, {}) for {}, restarting",
                    point.x,
                    point.y,
                    self.state.display_name()
                );
                self.reset();
            }
        }

        Ok(verdict)
    }

    /// Get the corner expected next
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Number of accepted points in this run
    pub fn num_clicks(&self) -> usize {
        self.points.iter().flatten().count()
    }

    /// Accepted points in click order
    pub fn accepted_points(&self) -> Vec<ClickPoint> {
        self.points.iter().flatten().copied().collect()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Compute the axis calibration from the four accepted points
    ///
    /// Opposite clicks sharing an edge are averaged, scaled by the display
    /// size, then extrapolated one block outward because the targets sit one
    /// block in from the true corners. Axes are swapped for portrait
    /// displays.
    ///
    /// # Returns
    /// * `Ok(AxisCalibration)` - Calibration computed
    /// * `Err(CalibrationError::NotComplete)` - Fewer than four clicks accepted
    pub fn finish(&self) -> Result<AxisCalibration, CalibrationError> {
        let (Some(ul), Some(ur), Some(ll), Some(lr)) =
            (self.points[0], self.points[1], self.points[2], self.points[3])
        else {
            return Err(CalibrationError::NotComplete {
                clicks: self.num_clicks(),
            });
        };

        let swap_xy = self.geometry.is_portrait();
        let scale_x = 1.0 / self.geometry.width as f64;
        let scale_y = 1.0 / self.geometry.height as f64;

        let mut x_min = scale_x * mean(ul.x, ll.x);
        let mut x_max = scale_x * mean(ur.x, lr.x);
        let mut y_min = scale_y * mean(ul.y, ur.y);
        let mut y_max = scale_y * mean(ll.y, lr.y);

        let inner_blocks = (NUM_BLOCKS - 2) as f64;
        let delta_x = (x_max - x_min) / inner_blocks;
        x_min -= delta_x;
        x_max += delta_x;
        let delta_y = (y_max - y_min) / inner_blocks;
        y_min -= delta_y;
        y_max += delta_y;

        if swap_xy {
            std::mem::swap(&mut x_min, &mut y_min);
            std::mem::swap(&mut x_max, &mut y_max);
        }

        log::info!(
            "[Calibrator] Final calibration: x=[{:.6}, {:.6}] y=[{:.6}, {:.6}] swap_xy={}",
            x_min,
            x_max,
            y_min,
            y_max,
            swap_xy
        );

        Ok(AxisCalibration {
            x_min,
            x_max,
            y_min,
            y_max,
            swap_xy,
        })
    }
}

fn mean(a: i32, b: i32) -> f64 {
    (a as f64 + b as f64) / 2.0
}

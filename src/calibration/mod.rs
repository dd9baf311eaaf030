// Calibration module - touchscreen/tablet calibration engine
//
// This module provides the pure, display-server independent part of
// calibration:
// 1. Geometry and target placement for the four corner targets
// 2. Calibrator: validates clicks and tracks which corner is expected next
// 3. AxisCalibration: the normalized transform computed from four clicks
//
// The calibration workflow:
// 1. Create a Calibrator for the display geometry and thresholds
// 2. Feed clicks for upper left, upper right, lower left, lower right
// 3. Call finish() to compute the AxisCalibration

pub mod axis;
pub mod calibrator;
pub mod geometry;
pub mod state;
pub mod validation;

pub use axis::{AxisCalibration, DeviceRange, Padding};
pub use calibrator::Calibrator;
pub use geometry::{ClickPoint, Geometry, TargetLayout, Thresholds, NUM_BLOCKS};
pub use state::CalibrationState;
pub use validation::{ClickValidator, ClickVerdict};

// AxisCalibration - the normalized result of a calibration run
//
// Values are screen coordinates scaled to [0, 1] by the display size and
// extrapolated one block outward, so a good calibration lands slightly
// outside [0, 1] on each edge.

use crate::error::CalibrationError;

/// Normalized min/max range per axis plus the axis swap flag
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisCalibration {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Device X/Y axes must be exchanged before scaling
    pub swap_xy: bool,
}

/// Distance of each calibrated edge from the matching screen edge
///
/// Starts at 0 on the edge; positive values grow towards the center.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Raw axis range reported (or pre-calibrated) for an absolute input device
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DeviceRange {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, CalibrationError> {
        if x_max <= x_min {
            return Err(CalibrationError::InvalidDeviceRange {
                reason: format!("x max {} <= min {}", x_max, x_min),
            });
        }
        if y_max <= y_min {
            return Err(CalibrationError::InvalidDeviceRange {
                reason: format!("y max {} <= min {}", y_max, y_min),
            });
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

impl AxisCalibration {
    pub fn padding(&self) -> Padding {
        Padding {
            left: self.x_min,
            right: 1.0 - self.x_max,
            top: self.y_min,
            bottom: 1.0 - self.y_max,
        }
    }

    /// Project the normalized calibration onto a raw device axis range
    pub fn to_device_range(&self, range: &DeviceRange) -> Result<AxisCalibration, CalibrationError> {
        let range = DeviceRange::new(range.x_min, range.x_max, range.y_min, range.y_max)?;
        let span_x = range.x_max - range.x_min;
        let span_y = range.y_max - range.y_min;

        Ok(AxisCalibration {
            x_min: range.x_min + self.x_min * span_x,
            x_max: range.x_min + self.x_max * span_x,
            y_min: range.y_min + self.y_min * span_y,
            y_max: range.y_min + self.y_max * span_y,
            swap_xy: self.swap_xy,
        })
    }

    /// Values in the `[x_min, y_min, x_max, y_max]` order used by settings stores
    pub fn area_for_storage(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

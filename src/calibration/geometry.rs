// Display geometry, click points and target placement
//
// The screen is conceptually divided into a NUM_BLOCKS x NUM_BLOCKS grid.
// Each of the four calibration targets sits at the grid block nearest its
// corner, one block in from the edge.

use crate::calibration::state::CalibrationState;
use crate::error::CalibrationError;

/// Number of blocks per axis in the target placement grid
pub const NUM_BLOCKS: u32 = 8;

/// Size of the display area being calibrated, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Largest dimension whose pixel coordinates fit a `ClickPoint`
    pub const MAX_DIMENSION: u32 = i32::MAX as u32;

    /// Create a geometry, rejecting zero-sized or out-of-range dimensions
    pub fn new(width: u32, height: u32) -> Result<Self, CalibrationError> {
        let in_range = |v: u32| (1..=Self::MAX_DIMENSION).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(CalibrationError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    /// Whether the display is taller than it is wide
    pub fn is_portrait(&self) -> bool {
        self.width < self.height
    }
}

/// A click position in screen pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClickPoint {
    pub x: i32,
    pub y: i32,
}

impl ClickPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when `other` lies within `threshold` pixels on both axes
    pub fn is_near(&self, other: &ClickPoint, threshold: u32) -> bool {
        self.x.abs_diff(other.x) <= threshold && self.y.abs_diff(other.y) <= threshold
    }
}

/// Pixel thresholds fixed for the lifetime of a calibration run
///
/// A value of 0 disables the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Thresholds {
    pub doubleclick: u32,
    pub misclick: u32,
}

impl Thresholds {
    pub fn new(doubleclick: u32, misclick: u32) -> Self {
        Self {
            doubleclick,
            misclick,
        }
    }
}

/// Centers of the four calibration targets for a given geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetLayout {
    targets: [ClickPoint; 4],
}

impl TargetLayout {
    /// Compute target centers, one block in from each corner
    ///
    /// Uses integer division, so the right/bottom targets land on
    /// `W - W/NUM_BLOCKS - 1` and `H - H/NUM_BLOCKS - 1`.
    ///
    /// Dimensions above `Geometry::MAX_DIMENSION` (only reachable through the
    /// public fields) are clamped to it.
    pub fn from_geometry(geometry: Geometry) -> Self {
        let width = pixel_coord(geometry.width);
        let height = pixel_coord(geometry.height);
        let delta_x = width / NUM_BLOCKS as i32;
        let delta_y = height / NUM_BLOCKS as i32;
        let right = width - delta_x - 1;
        let bottom = height - delta_y - 1;

        Self {
            targets: [
                ClickPoint::new(delta_x, delta_y),
                ClickPoint::new(right, delta_y),
                ClickPoint::new(delta_x, bottom),
                ClickPoint::new(right, bottom),
            ],
        }
    }

    /// Target for the given state, `None` once calibration is complete
    pub fn get(&self, state: CalibrationState) -> Option<ClickPoint> {
        state.index().map(|idx| self.targets[idx])
    }

    /// All four targets in click order
    pub fn points(&self) -> &[ClickPoint; 4] {
        &self.targets
    }
}

fn pixel_coord(dimension: u32) -> i32 {
    i32::try_from(dimension).unwrap_or(i32::MAX)
}

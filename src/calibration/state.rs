// CalibrationState - which corner target is expected next
//
// The first four values double as indices into the calibrator's array of
// accepted click points, in click order. `Complete` is terminal.

/// Calibration step, in the fixed order the user taps the targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum CalibrationState {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Complete,
}

impl CalibrationState {
    /// Number of corner targets collected per calibration run
    pub const TARGET_COUNT: usize = 4;

    /// Get the next state in the calibration sequence
    ///
    /// # Returns
    /// * `Some(CalibrationState)` - Next state
    /// * `None` - Already complete
    pub fn next(&self) -> Option<CalibrationState> {
        match self {
            CalibrationState::UpperLeft => Some(CalibrationState::UpperRight),
            CalibrationState::UpperRight => Some(CalibrationState::LowerLeft),
            CalibrationState::LowerLeft => Some(CalibrationState::LowerRight),
            CalibrationState::LowerRight => Some(CalibrationState::Complete),
            CalibrationState::Complete => None,
        }
    }

    /// Slot index of the point collected in this state, `None` for `Complete`
    pub fn index(&self) -> Option<usize> {
        match self {
            CalibrationState::UpperLeft => Some(0),
            CalibrationState::UpperRight => Some(1),
            CalibrationState::LowerLeft => Some(2),
            CalibrationState::LowerRight => Some(3),
            CalibrationState::Complete => None,
        }
    }

    /// State expecting the point at `index`
    pub fn from_index(index: usize) -> CalibrationState {
        match index {
            0 => CalibrationState::UpperLeft,
            1 => CalibrationState::UpperRight,
            2 => CalibrationState::LowerLeft,
            3 => CalibrationState::LowerRight,
            _ => CalibrationState::Complete,
        }
    }

    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            CalibrationState::UpperLeft => "UPPER LEFT",
            CalibrationState::UpperRight => "UPPER RIGHT",
            CalibrationState::LowerLeft => "LOWER LEFT",
            CalibrationState::LowerRight => "LOWER RIGHT",
            CalibrationState::Complete => "COMPLETE",
        }
    }

    pub fn is_complete(&self) -> bool {
        *self == CalibrationState::Complete
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        CalibrationState::UpperLeft
    }
}

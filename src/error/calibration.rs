// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Single source of truth for the numeric codes reported by
/// [`CalibrationError::code`].
///
/// Error code range: 3001-3008
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Display geometry has a zero or out-of-range dimension
    pub const INVALID_GEOMETRY: i32 = 3001;

    /// Calibration not complete (fewer than four accepted clicks)
    pub const NOT_COMPLETE: i32 = 3002;

    /// Click submitted after all four targets were accepted
    pub const ALREADY_COMPLETE: i32 = 3003;

    /// Calibration session already in progress
    pub const ALREADY_IN_PROGRESS: i32 = 3004;

    /// No calibration session is running
    pub const NOT_RUNNING: i32 = 3005;

    /// Session lock was poisoned
    pub const STATE_POISONED: i32 = 3006;

    /// Raw device axis range is empty or inverted
    pub const INVALID_DEVICE_RANGE: i32 = 3007;

    /// Progress broadcast channel has not been created
    pub const CHANNEL_NOT_INITIALIZED: i32 = 3008;
}

/// Log a calibration error with structured context
///
/// Emits the numeric code, the component and the human-readable message.
/// The logging is non-blocking and will not panic on failure.
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=Calibrator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// Misclicks and double-clicks are not errors: they are ordinary verdicts of
/// the click validator. These variants cover contract violations and
/// lifecycle misuse.
///
/// Error code range: 3001-3008
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Display geometry has a zero or out-of-range dimension
    InvalidGeometry { width: u32, height: u32 },

    /// `finish()` called before four clicks were accepted
    NotComplete { clicks: usize },

    /// Click submitted to a calibrator that already holds four points
    AlreadyComplete,

    /// Calibration session already in progress
    AlreadyInProgress,

    /// No calibration session is running
    NotRunning,

    /// Session lock was poisoned
    StatePoisoned,

    /// Raw device axis range is empty or inverted
    InvalidDeviceRange { reason: String },

    /// Progress broadcast channel has not been created
    ChannelNotInitialized,
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::InvalidGeometry { .. } => CalibrationErrorCodes::INVALID_GEOMETRY,
            CalibrationError::NotComplete { .. } => CalibrationErrorCodes::NOT_COMPLETE,
            CalibrationError::AlreadyComplete => CalibrationErrorCodes::ALREADY_COMPLETE,
            CalibrationError::AlreadyInProgress => CalibrationErrorCodes::ALREADY_IN_PROGRESS,
            CalibrationError::NotRunning => CalibrationErrorCodes::NOT_RUNNING,
            CalibrationError::StatePoisoned => CalibrationErrorCodes::STATE_POISONED,
            CalibrationError::InvalidDeviceRange { .. } => {
                CalibrationErrorCodes::INVALID_DEVICE_RANGE
            }
            CalibrationError::ChannelNotInitialized => {
                CalibrationErrorCodes::CHANNEL_NOT_INITIALIZED
            }
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::InvalidGeometry { width, height } => {
                format!(
                    "Invalid geometry: {}x{} must be 1..={} pixels per axis",
                    width,
                    height,
                    i32::MAX
                )
            }
            CalibrationError::NotComplete { clicks } => {
                format!("Calibration not complete: {} of 4 clicks accepted", clicks)
            }
            CalibrationError::AlreadyComplete => {
                "Calibration already complete; no further clicks accepted".to_string()
            }
            CalibrationError::AlreadyInProgress => "Calibration already in progress".to_string(),
            CalibrationError::NotRunning => "No calibration session running".to_string(),
            CalibrationError::StatePoisoned => "Calibration session lock poisoned".to_string(),
            CalibrationError::InvalidDeviceRange { reason } => {
                format!("Invalid device range: {}", reason)
            }
            CalibrationError::ChannelNotInitialized => {
                "Progress channel not initialized".to_string()
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}

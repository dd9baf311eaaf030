// Error types for the touch calibrator
//
// This module defines the calibration error type, providing structured error
// handling with numeric codes suitable for reporting across process boundaries
// (the CLI maps them to exit codes and stderr payloads).

mod calibration;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

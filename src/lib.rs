// Touch Calibrator Core - touchscreen and tablet calibration engine
// Four-point calibrator state machine with a session driver for event loops

// Module declarations
pub mod calibration;
pub mod config;
pub mod error;
pub mod managers;
pub mod output;
pub mod session;

// Re-exports for convenience
pub use calibration::{
    AxisCalibration, CalibrationState, Calibrator, ClickPoint, ClickVerdict, DeviceRange,
    Geometry, TargetLayout, Thresholds,
};
pub use error::{CalibrationError, ErrorCode};
pub use managers::CalibrationManager;
pub use session::{AbortReason, CalibrationSession, ClickOutcome, SessionState};

// Managers Module
//
// Focused manager classes for embedding the calibration engine in an event
// loop:
// - CalibrationManager: session lifecycle, progress broadcast, last result

pub mod calibration_manager;

pub use calibration_manager::CalibrationManager;

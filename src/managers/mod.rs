// Managers - facade objects wiring the calibration components together

pub mod calibration_manager;

pub use calibration_manager::{CalibrationManager, CalibrationOutcome};

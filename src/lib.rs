// Soilsense Core - sensor calibration and environmental compensation engine
//
// Converts two-point reference runs into per-channel linear corrections,
// applies temperature/humidity compensation models to raw readings, and owns
// the persisted calibration state the device API reports and exports.

// Module declarations
pub mod calibration;
pub mod channel;
pub mod compensation;
pub mod config;
pub mod error;
pub mod managers;
pub mod storage;

#[cfg(feature = "http_api")]
pub mod http;

// Re-exports for convenience
pub use calibration::{
    CalibrationPoint, CalibrationProfile, CalibrationStatusReport, CalibrationStatusReporter,
    CalibrationStore, GlobalCalibrationState, Quality, TwoPointCalibrator,
};
pub use channel::{Channel, ALL_CHANNELS};
pub use config::AppConfig;
pub use error::{CalibrationError, ErrorCode};
pub use managers::{CalibrationManager, CalibrationOutcome};
pub use storage::{CalibrationRepository, FileRepository, MemoryRepository};

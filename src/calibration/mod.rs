// Calibration module - profiles, two-point derivation, store, status
//
// Components:
// 1. CalibrationProfile / GlobalCalibrationState: the persisted coefficients
// 2. TwoPointCalibrator: derives a profile from two reference points
// 3. CalibrationStore: locked owner of the state plus durable persistence
// 4. CalibrationStatusReporter: consistent snapshots for external consumers

pub mod profile;
pub mod status;
pub mod store;
pub mod two_point;

pub use profile::{CalibrationPoint, CalibrationProfile, GlobalCalibrationState, Quality};
pub use status::{CalibrationStatusReport, CalibrationStatusReporter, ChannelStatus};
pub use store::CalibrationStore;
pub use two_point::TwoPointCalibrator;

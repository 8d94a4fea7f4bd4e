// CalibrationManager: facade over the calibration components
//
// Bundles the store, the two-point calibrator, the compensation engine, and
// the status reporter behind the operations the device API consumes. Every
// component receives an explicit handle; there is no ambient singleton state.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calibration::{
    CalibrationPoint, CalibrationStatusReport, CalibrationStatusReporter, CalibrationStore,
    GlobalCalibrationState, Quality, TwoPointCalibrator,
};
use crate::channel::{Channel, ALL_CHANNELS};
use crate::compensation;
use crate::config::AppConfig;
use crate::error::{log_calibration_error, CalibrationError};
use crate::storage::CalibrationRepository;

/// Result of a successful two-point calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    pub scale: f64,
    pub shift: f64,
    pub quality: Quality,
}

/// Facade wiring store, calibrator, compensation, and status reporting.
pub struct CalibrationManager {
    store: Arc<CalibrationStore>,
    calibrator: TwoPointCalibrator,
}

impl CalibrationManager {
    /// Create a manager with default (uncalibrated) state; call [`boot`] to
    /// restore persisted profiles.
    ///
    /// [`boot`]: CalibrationManager::boot
    pub fn new(config: &AppConfig, repository: Box<dyn CalibrationRepository>) -> Self {
        Self {
            store: Arc::new(CalibrationStore::new(repository)),
            calibrator: TwoPointCalibrator::new(config.quality),
        }
    }

    /// Restore persisted calibration state. Never fails; missing or corrupt
    /// storage degrades to the default uncalibrated state.
    pub fn boot(&self) {
        self.store.load();
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<CalibrationStore> {
        Arc::clone(&self.store)
    }

    /// Run a two-point calibration for a channel and persist the result.
    ///
    /// Input validation errors are rejected before storage: the previous
    /// profile stays untouched.
    pub fn calibrate(
        &self,
        channel: Channel,
        expected1: f64,
        measured1: f64,
        expected2: f64,
        measured2: f64,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        let profile = self
            .calibrator
            .derive(
                channel,
                CalibrationPoint::new(expected1, measured1),
                CalibrationPoint::new(expected2, measured2),
                now_timestamp(),
            )
            .inspect_err(|err| log_calibration_error(err, "calibrate"))?;

        self.store.set(channel, profile)?;

        Ok(CalibrationOutcome {
            scale: profile.scale,
            shift: profile.shift,
            quality: profile.quality,
        })
    }

    /// Apply calibration correction plus environmental compensation to a raw
    /// reading.
    ///
    /// When calibration is globally disabled or the channel is uncalibrated,
    /// the correction step is skipped but the environmental model still
    /// applies to the raw value.
    pub fn apply_compensation(
        &self,
        channel: Channel,
        raw: f64,
        temperature: f64,
        humidity: f64,
    ) -> f64 {
        let profile = self.store.get(channel);
        let corrected = if self.store.is_enabled() && profile.calibrated {
            profile.correct(raw)
        } else {
            debug!(
                "[Compensation] {} calibration bypassed (enabled={}, calibrated={})",
                channel,
                self.store.is_enabled(),
                profile.calibrated
            );
            raw
        };

        compensation::compensate(channel, corrected, temperature, humidity)
    }

    /// Consistent status snapshot of every channel.
    pub fn status(&self) -> CalibrationStatusReport {
        CalibrationStatusReporter::report(&self.store)
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), CalibrationError> {
        self.store.set_enabled(enabled)
    }

    /// Return a channel to the uncalibrated identity profile.
    pub fn reset(&self, channel: Channel) -> Result<(), CalibrationError> {
        self.store.reset(channel)
    }

    /// Serialize the full calibration state for configuration export.
    pub fn export_profile(&self) -> Result<String, CalibrationError> {
        serde_json::to_string_pretty(&self.store.snapshot()).map_err(|err| {
            CalibrationError::PersistenceFailure {
                reason: format!("export serialization failed: {}", err),
            }
        })
    }

    /// Import a previously exported calibration state.
    ///
    /// Every profile is validated against the same invariants `calibrate`
    /// enforces before anything is committed; one bad field rejects the
    /// whole document and leaves the current state untouched.
    pub fn import_profile(&self, serialized: &str) -> Result<(), CalibrationError> {
        let state: GlobalCalibrationState =
            serde_json::from_str(serialized).map_err(|err| CalibrationError::InvalidImport {
                reason: format!("malformed document: {}", err),
            })?;

        for channel in ALL_CHANNELS {
            let profile = state.profile(channel);
            if !profile.is_well_formed() {
                let err = CalibrationError::InvalidImport {
                    reason: format!(
                        "profile for {} violates invariants (scale={}, shift={})",
                        channel, profile.scale, profile.shift
                    ),
                };
                log_calibration_error(&err, "import_profile");
                return Err(err);
            }
        }

        self.store.replace(state)
    }
}

/// Unix seconds, saturating at the persisted record's u32 range.
fn now_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .min(u32::MAX as u64) as u32
}

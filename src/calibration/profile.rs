// Calibration profile storage types
//
// A profile is the per-channel linear correction derived from a two-point
// calibration run. Uncalibrated channels carry the identity profile
// (scale=1, shift=0) so the correction can always be applied unconditionally.
//
// Invariant: when `calibrated` is true, `scale` is finite and nonzero and
// `shift` is finite. `quality` is only meaningful for calibrated profiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ALL_CHANNELS};

/// One reference measurement: what the sensor read vs. what it should read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Reference value (buffer solution, lab meter)
    pub expected: f64,
    /// Sensor reading at the reference
    pub measured: f64,
}

impl CalibrationPoint {
    pub fn new(expected: f64, measured: f64) -> Self {
        Self { expected, measured }
    }
}

/// Coarse classification of how far a calibration's scale sits from unity.
///
/// Poor calibrations are stored, not rejected; the flag lets operators spot
/// suspect geometry and re-run the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Quality {
    /// Compact discriminant for the persisted record layout.
    pub fn as_u8(self) -> u8 {
        match self {
            Quality::Excellent => 0,
            Quality::Good => 1,
            Quality::Acceptable => 2,
            Quality::Poor => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Excellent => "excellent",
            Quality::Good => "good",
            Quality::Acceptable => "acceptable",
            Quality::Poor => "poor",
        }
    }
}

/// Per-channel linear correction coefficients plus calibration metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub scale: f64,
    pub shift: f64,
    pub calibrated: bool,
    pub quality: Quality,
    /// Unix seconds of the last successful calibration, 0 if never
    #[serde(default)]
    pub timestamp: u32,
}

impl CalibrationProfile {
    /// The no-op correction used before a channel is calibrated.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            shift: 0.0,
            calibrated: false,
            quality: Quality::Poor,
            timestamp: 0,
        }
    }

    /// Apply the linear correction to a raw reading.
    pub fn correct(&self, raw: f64) -> f64 {
        raw * self.scale + self.shift
    }

    /// Check the stored-profile invariant (used by import validation).
    pub fn is_well_formed(&self) -> bool {
        if !self.scale.is_finite() || !self.shift.is_finite() {
            return false;
        }
        if self.calibrated && self.scale == 0.0 {
            return false;
        }
        true
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::identity()
    }
}

/// The complete persisted calibration state of the device.
///
/// Owned exclusively by the store; everything else works on copies or locked
/// views. The JSON form of this struct is both the on-device persisted layout
/// and the export/import wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalCalibrationState {
    /// Global switch: when false, calibration correction is bypassed for
    /// every channel without erasing the stored profiles.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub profiles: BTreeMap<Channel, CalibrationProfile>,
}

/// Calibration correction defaults to active for backward compatibility with
/// state files that predate the global switch.
fn default_enabled() -> bool {
    true
}

impl GlobalCalibrationState {
    /// Default state: enabled, identity profile on every channel.
    pub fn new_default() -> Self {
        let profiles = ALL_CHANNELS
            .iter()
            .map(|&channel| (channel, CalibrationProfile::identity()))
            .collect();
        Self {
            enabled: true,
            profiles,
        }
    }

    /// Profile for a channel; identity if the map entry is missing (e.g. a
    /// state file written by older firmware without NPK support).
    pub fn profile(&self, channel: Channel) -> CalibrationProfile {
        self.profiles
            .get(&channel)
            .copied()
            .unwrap_or_else(CalibrationProfile::identity)
    }

    /// Ensure every channel has an entry, filling gaps with identity.
    pub fn normalize(&mut self) {
        for channel in ALL_CHANNELS {
            self.profiles
                .entry(channel)
                .or_insert_with(CalibrationProfile::identity);
        }
    }
}

impl Default for GlobalCalibrationState {
    fn default() -> Self {
        Self::new_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_profile() {
        let profile = CalibrationProfile::identity();
        assert_eq!(profile.scale, 1.0);
        assert_eq!(profile.shift, 0.0);
        assert!(!profile.calibrated);
        assert_eq!(profile.timestamp, 0);
        assert_eq!(profile.correct(42.5), 42.5);
    }

    #[test]
    fn test_correct_applies_scale_then_shift() {
        let profile = CalibrationProfile {
            scale: 2.0,
            shift: -3.0,
            calibrated: true,
            quality: Quality::Good,
            timestamp: 100,
        };
        assert_eq!(profile.correct(10.0), 17.0);
    }

    #[test]
    fn test_well_formed_invariant() {
        let mut profile = CalibrationProfile::identity();
        assert!(profile.is_well_formed());

        profile.calibrated = true;
        profile.scale = 0.0;
        assert!(!profile.is_well_formed());

        profile.scale = f64::NAN;
        assert!(!profile.is_well_formed());

        profile.scale = 1.2;
        profile.shift = f64::INFINITY;
        assert!(!profile.is_well_formed());
    }

    #[test]
    fn test_default_state_covers_every_channel() {
        let state = GlobalCalibrationState::new_default();
        assert!(state.enabled);
        assert_eq!(state.profiles.len(), ALL_CHANNELS.len());
        for channel in ALL_CHANNELS {
            assert!(!state.profile(channel).calibrated);
        }
    }

    #[test]
    fn test_normalize_fills_missing_channels() {
        let mut state = GlobalCalibrationState {
            enabled: true,
            profiles: BTreeMap::new(),
        };
        // Missing entries still answer with identity
        assert_eq!(state.profile(Channel::Ec), CalibrationProfile::identity());

        state.normalize();
        assert_eq!(state.profiles.len(), ALL_CHANNELS.len());
    }

    #[test]
    fn test_serde_round_trip_is_bit_identical() {
        let mut state = GlobalCalibrationState::new_default();
        state.profiles.insert(
            Channel::Ec,
            CalibrationProfile {
                scale: 1.0526315789473684,
                shift: 0.0000000000004547,
                calibrated: true,
                quality: Quality::Good,
                timestamp: 1_700_000_000,
            },
        );

        let json = serde_json::to_string(&state).unwrap();
        let restored: GlobalCalibrationState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);

        let ec = restored.profile(Channel::Ec);
        assert_eq!(ec.scale.to_bits(), 1.0526315789473684_f64.to_bits());
    }

    #[test]
    fn test_legacy_state_without_enabled_flag() {
        // State files written before the global switch existed
        let json = r#"{"profiles": {"ec": {"scale": 1.1, "shift": 0.5, "calibrated": true, "quality": "good"}}}"#;
        let state: GlobalCalibrationState = serde_json::from_str(json).unwrap();
        assert!(state.enabled);
        assert_eq!(state.profile(Channel::Ec).timestamp, 0);
    }

    #[test]
    fn test_quality_wire_and_record_forms() {
        assert_eq!(serde_json::to_string(&Quality::Excellent).unwrap(), "\"excellent\"");
        assert_eq!(Quality::Poor.as_u8(), 3);
        assert_eq!(Quality::Excellent.as_u8(), 0);
        assert_eq!(Quality::Good.as_str(), "good");
    }
}

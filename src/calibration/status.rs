// CalibrationStatusReporter - consistent status snapshots for the API layer
//
// Pure read over the store. The wire rendering keeps the flat field names of
// the existing device contract (`calibration_enabled`, `ec_calibrated`, ...)
// so external consumers keep working unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::channel::{Channel, ALL_CHANNELS};

use super::profile::Quality;
use super::store::CalibrationStore;

/// Status of one channel's calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub calibrated: bool,
    /// Only present for calibrated channels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    pub scale: f64,
    pub shift: f64,
    pub timestamp: u32,
}

/// Snapshot of the whole calibration state for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStatusReport {
    pub enabled: bool,
    pub channels: BTreeMap<Channel, ChannelStatus>,
}

impl CalibrationStatusReport {
    /// Status for one channel. Reports deserialized from an external source
    /// may omit channels; those fall back to the uncalibrated identity.
    pub fn channel(&self, channel: Channel) -> &ChannelStatus {
        static IDENTITY: ChannelStatus = ChannelStatus {
            calibrated: false,
            quality: None,
            scale: 1.0,
            shift: 0.0,
            timestamp: 0,
        };
        self.channels.get(&channel).unwrap_or(&IDENTITY)
    }

    /// Render the report with the device's legacy flat field names.
    ///
    /// Produces `calibration_enabled` plus `<channel>_calibrated`,
    /// `<channel>_scale`, `<channel>_shift`, `<channel>_timestamp`, and
    /// `<channel>_quality` for calibrated channels.
    pub fn to_legacy_json(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("success".to_string(), json!(true));
        fields.insert("calibration_enabled".to_string(), json!(self.enabled));

        for (&channel, status) in &self.channels {
            let prefix = channel.as_str();
            fields.insert(format!("{prefix}_calibrated"), json!(status.calibrated));
            fields.insert(format!("{prefix}_scale"), json!(status.scale));
            fields.insert(format!("{prefix}_shift"), json!(status.shift));
            fields.insert(format!("{prefix}_timestamp"), json!(status.timestamp));
            if let Some(quality) = status.quality {
                fields.insert(format!("{prefix}_quality"), json!(quality.as_str()));
            }
        }

        Value::Object(fields)
    }
}

/// Assembles consistent snapshots of the store for status queries.
pub struct CalibrationStatusReporter;

impl CalibrationStatusReporter {
    /// Take a consistent snapshot of every channel's state.
    ///
    /// A single store snapshot backs the whole report, so a concurrent
    /// calibration cannot produce a report mixing old and new coefficients.
    pub fn report(store: &CalibrationStore) -> CalibrationStatusReport {
        let state = store.snapshot();
        let channels = ALL_CHANNELS
            .iter()
            .map(|&channel| {
                let profile = state.profile(channel);
                let status = ChannelStatus {
                    calibrated: profile.calibrated,
                    quality: profile.calibrated.then_some(profile.quality),
                    scale: profile.scale,
                    shift: profile.shift,
                    timestamp: profile.timestamp,
                };
                (channel, status)
            })
            .collect();

        CalibrationStatusReport {
            enabled: state.enabled,
            channels,
        }
    }
}

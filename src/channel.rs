// Sensor channel model
//
// The device exposes a fixed set of measured quantities. Each channel has its
// own calibration profile and its own environmental compensation model, so
// everything downstream dispatches on this closed enum instead of comparing
// channel names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// One physical or derived sensor quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Ec,
    Ph,
    Temperature,
    Humidity,
    Nitrogen,
    Phosphorus,
    Potassium,
}

/// All channels in wire order.
pub const ALL_CHANNELS: [Channel; 7] = [
    Channel::Ec,
    Channel::Ph,
    Channel::Temperature,
    Channel::Humidity,
    Channel::Nitrogen,
    Channel::Phosphorus,
    Channel::Potassium,
];

impl Channel {
    /// Wire/API name of the channel, matching the device's HTTP routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Ec => "ec",
            Channel::Ph => "ph",
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Nitrogen => "nitrogen",
            Channel::Phosphorus => "phosphorus",
            Channel::Potassium => "potassium",
        }
    }

    /// Physically plausible value range for calibration points.
    ///
    /// EC in µS/cm, temperature in °C, humidity in %, NPK in mg/kg.
    pub fn plausible_range(self) -> (f64, f64) {
        match self {
            Channel::Ec => (0.0, 20_000.0),
            Channel::Ph => (0.0, 14.0),
            Channel::Temperature => (-40.0, 80.0),
            Channel::Humidity => (0.0, 100.0),
            Channel::Nitrogen | Channel::Phosphorus | Channel::Potassium => (0.0, 2_000.0),
        }
    }

    /// Whether a value on this channel is within its plausible range.
    ///
    /// Non-finite values are never plausible.
    pub fn contains(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let (lo, hi) = self.plausible_range();
        (lo..=hi).contains(&value)
    }

    /// Concentration-like channels clamp negative compensated values to zero.
    pub fn clamps_negative(self) -> bool {
        matches!(
            self,
            Channel::Ec | Channel::Nitrogen | Channel::Phosphorus | Channel::Potassium
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CalibrationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "ec" => Ok(Channel::Ec),
            "ph" => Ok(Channel::Ph),
            "temperature" => Ok(Channel::Temperature),
            "humidity" => Ok(Channel::Humidity),
            "nitrogen" => Ok(Channel::Nitrogen),
            "phosphorus" => Ok(Channel::Phosphorus),
            "potassium" => Ok(Channel::Potassium),
            other => Err(CalibrationError::InvalidChannel {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for channel in ALL_CHANNELS {
            let parsed: Channel = channel.as_str().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let result = "salinity".parse::<Channel>();
        assert!(matches!(
            result,
            Err(CalibrationError::InvalidChannel { name }) if name == "salinity"
        ));
    }

    #[test]
    fn test_plausible_ranges() {
        assert!(Channel::Ec.contains(0.0));
        assert!(Channel::Ec.contains(20_000.0));
        assert!(!Channel::Ec.contains(20_000.1));
        assert!(Channel::Ph.contains(7.0));
        assert!(!Channel::Ph.contains(14.5));
        assert!(Channel::Temperature.contains(-40.0));
        assert!(!Channel::Temperature.contains(-41.0));
        assert!(Channel::Nitrogen.contains(2_000.0));
        assert!(!Channel::Potassium.contains(-1.0));
    }

    #[test]
    fn test_non_finite_never_plausible() {
        assert!(!Channel::Ec.contains(f64::NAN));
        assert!(!Channel::Ph.contains(f64::INFINITY));
        assert!(!Channel::Temperature.contains(f64::NEG_INFINITY));
    }

    #[test]
    fn test_negative_clamp_set() {
        assert!(Channel::Ec.clamps_negative());
        assert!(Channel::Nitrogen.clamps_negative());
        assert!(!Channel::Ph.clamps_negative());
        assert!(!Channel::Temperature.clamps_negative());
        assert!(!Channel::Humidity.clamps_negative());
    }

    #[test]
    fn test_serde_wire_form() {
        let json = serde_json::to_string(&Channel::Phosphorus).unwrap();
        assert_eq!(json, "\"phosphorus\"");
        let parsed: Channel = serde_json::from_str("\"ec\"").unwrap();
        assert_eq!(parsed, Channel::Ec);
    }
}

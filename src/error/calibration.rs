// Calibration error types and constants

use std::fmt;

use log::error;

use crate::error::ErrorCode;

/// Calibration error code constants exposed through the device API
///
/// These constants provide a single source of truth for error codes shared
/// between the core and external consumers (HTTP layer, CLI, exporters).
///
/// Error code range: 3001-3005
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Two calibration points do not differ on one of the axes
    pub const DEGENERATE_POINTS: i32 = 3001;

    /// Calibration point outside the channel's physically plausible range
    pub const OUT_OF_RANGE: i32 = 3002;

    /// Unknown channel identifier
    pub const INVALID_CHANNEL: i32 = 3003;

    /// Durable storage read/write failed
    pub const PERSISTENCE_FAILURE: i32 = 3004;

    /// Imported calibration document violated a profile invariant
    pub const INVALID_IMPORT: i32 = 3005;
}

/// Log a calibration error with structured context
///
/// Logs the numeric error code alongside the component and operation so log
/// consumers can filter without parsing the message text.
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// Covers two-point calibration input validation, channel dispatch,
/// persistence, and profile import.
///
/// Error code range: 3001-3005
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Two calibration points share an expected or measured value
    DegeneratePoints { axis: &'static str, value: f64 },

    /// A calibration point value violates the channel's plausible range
    OutOfRange {
        channel: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Unknown channel identifier
    InvalidChannel { name: String },

    /// Durable storage write/read failed after retry
    PersistenceFailure { reason: String },

    /// Imported calibration document rejected
    InvalidImport { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::DegeneratePoints { .. } => CalibrationErrorCodes::DEGENERATE_POINTS,
            CalibrationError::OutOfRange { .. } => CalibrationErrorCodes::OUT_OF_RANGE,
            CalibrationError::InvalidChannel { .. } => CalibrationErrorCodes::INVALID_CHANNEL,
            CalibrationError::PersistenceFailure { .. } => {
                CalibrationErrorCodes::PERSISTENCE_FAILURE
            }
            CalibrationError::InvalidImport { .. } => CalibrationErrorCodes::INVALID_IMPORT,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::DegeneratePoints { axis, value } => {
                format!("Degenerate calibration points: both {} values are {}", axis, value)
            }
            CalibrationError::OutOfRange {
                channel,
                value,
                min,
                max,
            } => {
                format!(
                    "Value {} out of range [{}, {}] for channel {}",
                    value, min, max, channel
                )
            }
            CalibrationError::InvalidChannel { name } => {
                format!("Unknown channel: {}", name)
            }
            CalibrationError::PersistenceFailure { reason } => {
                format!("Persistence failure: {}", reason)
            }
            CalibrationError::InvalidImport { reason } => {
                format!("Import rejected: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalibrationError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for CalibrationError {}

/// Stable reason tag for API payloads (`{"success": false, "reason": ...}`).
impl CalibrationError {
    pub fn reason_tag(&self) -> &'static str {
        match self {
            CalibrationError::DegeneratePoints { .. } => "DEGENERATE_POINTS",
            CalibrationError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalibrationError::InvalidChannel { .. } => "INVALID_CHANNEL",
            CalibrationError::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
            CalibrationError::InvalidImport { .. } => "INVALID_IMPORT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalibrationError::DegeneratePoints {
                axis: "expected",
                value: 7.0
            }
            .code(),
            CalibrationErrorCodes::DEGENERATE_POINTS
        );
        assert_eq!(
            CalibrationError::OutOfRange {
                channel: "ph",
                value: 15.0,
                min: 0.0,
                max: 14.0
            }
            .code(),
            CalibrationErrorCodes::OUT_OF_RANGE
        );
        assert_eq!(
            CalibrationError::InvalidChannel {
                name: "x".to_string()
            }
            .code(),
            CalibrationErrorCodes::INVALID_CHANNEL
        );
        assert_eq!(
            CalibrationError::PersistenceFailure {
                reason: "x".to_string()
            }
            .code(),
            CalibrationErrorCodes::PERSISTENCE_FAILURE
        );
        assert_eq!(
            CalibrationError::InvalidImport {
                reason: "x".to_string()
            }
            .code(),
            CalibrationErrorCodes::INVALID_IMPORT
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CalibrationError::DegeneratePoints {
            axis: "measured",
            value: 1000.0,
        };
        assert_eq!(
            err.message(),
            "Degenerate calibration points: both measured values are 1000"
        );

        let err = CalibrationError::OutOfRange {
            channel: "ph",
            value: 15.0,
            min: 0.0,
            max: 14.0,
        };
        assert!(err.message().contains("15"));
        assert!(err.message().contains("ph"));

        let err = CalibrationError::InvalidChannel {
            name: "salinity".to_string(),
        };
        assert!(err.message().contains("salinity"));
    }

    #[test]
    fn test_reason_tags_are_stable() {
        let err = CalibrationError::DegeneratePoints {
            axis: "expected",
            value: 0.0,
        };
        assert_eq!(err.reason_tag(), "DEGENERATE_POINTS");
        let err = CalibrationError::PersistenceFailure {
            reason: "disk".to_string(),
        };
        assert_eq!(err.reason_tag(), "PERSISTENCE_FAILURE");
    }

    #[test]
    fn test_display_includes_code() {
        let err = CalibrationError::InvalidChannel {
            name: "x".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("3003"));
    }
}

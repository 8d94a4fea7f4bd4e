// Error types for the calibration core
//
// This module defines the structured error type for calibration and
// persistence operations, with numeric error codes so API consumers can
// branch on reason without parsing message strings.

mod calibration;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the API boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

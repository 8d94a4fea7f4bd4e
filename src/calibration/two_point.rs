// Two-point calibration
//
// Derives a linear correction y = scale * x + shift from two
// (expected, measured) reference pairs. Validation happens before anything
// touches the store: degenerate or implausible points are rejected and the
// previous profile stays untouched.

use log::{debug, warn};

use crate::channel::Channel;
use crate::config::QualityThresholds;
use crate::error::CalibrationError;

use super::profile::{CalibrationPoint, CalibrationProfile, Quality};

/// Derives calibration profiles from two-point reference runs.
#[derive(Debug, Clone, Copy)]
pub struct TwoPointCalibrator {
    thresholds: QualityThresholds,
}

impl TwoPointCalibrator {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    /// Derive a calibration profile from two reference points.
    ///
    /// `scale = (expected2 - expected1) / (measured2 - measured1)`,
    /// `shift = expected1 - scale * measured1`. The correction applied to a
    /// later raw reading `r` is `r * scale + shift`.
    ///
    /// `timestamp` is unix seconds, recorded into the profile on success.
    ///
    /// # Errors
    /// * `DegeneratePoints` when the two points share an expected or
    ///   measured value (the fit would be vertical or flat)
    /// * `OutOfRange` when any of the four values is non-finite or outside
    ///   the channel's plausible range
    pub fn derive(
        &self,
        channel: Channel,
        point1: CalibrationPoint,
        point2: CalibrationPoint,
        timestamp: u32,
    ) -> Result<CalibrationProfile, CalibrationError> {
        validate_point(channel, point1)?;
        validate_point(channel, point2)?;

        if point1.expected == point2.expected {
            return Err(CalibrationError::DegeneratePoints {
                axis: "expected",
                value: point1.expected,
            });
        }
        if point1.measured == point2.measured {
            return Err(CalibrationError::DegeneratePoints {
                axis: "measured",
                value: point1.measured,
            });
        }

        let scale = (point2.expected - point1.expected) / (point2.measured - point1.measured);
        let shift = point1.expected - scale * point1.measured;

        let quality = self.classify(scale);
        if quality == Quality::Poor {
            warn!(
                "[Calibration] {} calibration accepted with poor geometry: scale={:.4}",
                channel, scale
            );
        } else {
            debug!(
                "[Calibration] {} profile derived: scale={:.4} shift={:.4} quality={}",
                channel,
                scale,
                shift,
                quality.as_str()
            );
        }

        Ok(CalibrationProfile {
            scale,
            shift,
            calibrated: true,
            quality,
            timestamp,
        })
    }

    /// Classify a scale by its deviation from unity. Boundaries are
    /// inclusive: a scale sitting exactly on a threshold gets the better
    /// grade.
    pub fn classify(&self, scale: f64) -> Quality {
        // Compare against the scale bounds directly instead of |scale - 1|,
        // which rounds up by one ULP at the thresholds (1.05 - 1.0 > 0.05).
        let within = |deviation: f64| {
            scale >= 1.0 - deviation && scale <= 1.0 + deviation
        };
        if within(self.thresholds.excellent) {
            Quality::Excellent
        } else if within(self.thresholds.good) {
            Quality::Good
        } else if scale >= self.thresholds.acceptable_min && scale <= self.thresholds.acceptable_max
        {
            Quality::Acceptable
        } else {
            Quality::Poor
        }
    }
}

impl Default for TwoPointCalibrator {
    fn default() -> Self {
        Self::new(QualityThresholds::default())
    }
}

fn validate_point(channel: Channel, point: CalibrationPoint) -> Result<(), CalibrationError> {
    for value in [point.expected, point.measured] {
        if !channel.contains(value) {
            let (min, max) = channel.plausible_range();
            return Err(CalibrationError::OutOfRange {
                channel: channel.as_str(),
                value,
                min,
                max,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrator() -> TwoPointCalibrator {
        TwoPointCalibrator::default()
    }

    #[test]
    fn test_ec_two_point_example() {
        // Reference buffers at 1000 and 2000 µS/cm, sensor reads 5% low
        let profile = calibrator()
            .derive(
                Channel::Ec,
                CalibrationPoint::new(1000.0, 950.0),
                CalibrationPoint::new(2000.0, 1900.0),
                1_700_000_000,
            )
            .unwrap();

        assert!((profile.scale - 1.0526315789).abs() < 1e-9);
        assert!(profile.shift.abs() < 1e-9);
        assert_eq!(profile.quality, Quality::Good);
        assert!(profile.calibrated);
        assert_eq!(profile.timestamp, 1_700_000_000);

        // The correction recovers the reference value
        assert!((profile.correct(950.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_shift_only_correction() {
        // Sensor reads exactly 0.5 pH high at both buffers: scale 1, shift -0.5
        let profile = calibrator()
            .derive(
                Channel::Ph,
                CalibrationPoint::new(4.01, 4.51),
                CalibrationPoint::new(6.86, 7.36),
                0,
            )
            .unwrap();

        assert!((profile.scale - 1.0).abs() < 1e-9);
        assert!((profile.shift + 0.5).abs() < 1e-9);
        assert_eq!(profile.quality, Quality::Excellent);
    }

    #[test]
    fn test_equal_expected_rejected() {
        let result = calibrator().derive(
            Channel::Ec,
            CalibrationPoint::new(1000.0, 1000.0),
            CalibrationPoint::new(1000.0, 2000.0),
            0,
        );
        assert!(matches!(
            result,
            Err(CalibrationError::DegeneratePoints { axis: "expected", .. })
        ));
    }

    #[test]
    fn test_equal_measured_rejected() {
        let result = calibrator().derive(
            Channel::Ec,
            CalibrationPoint::new(1000.0, 1500.0),
            CalibrationPoint::new(2000.0, 1500.0),
            0,
        );
        assert!(matches!(
            result,
            Err(CalibrationError::DegeneratePoints { axis: "measured", .. })
        ));
    }

    #[test]
    fn test_out_of_range_rejected() {
        // pH cannot exceed 14
        let result = calibrator().derive(
            Channel::Ph,
            CalibrationPoint::new(4.01, 4.2),
            CalibrationPoint::new(15.0, 9.3),
            0,
        );
        assert!(matches!(
            result,
            Err(CalibrationError::OutOfRange { channel: "ph", .. })
        ));

        // NaN is never plausible
        let result = calibrator().derive(
            Channel::Ec,
            CalibrationPoint::new(f64::NAN, 950.0),
            CalibrationPoint::new(2000.0, 1900.0),
            0,
        );
        assert!(matches!(result, Err(CalibrationError::OutOfRange { .. })));
    }

    #[test]
    fn test_quality_boundaries() {
        let calibrator = calibrator();
        assert_eq!(calibrator.classify(1.0), Quality::Excellent);
        assert_eq!(calibrator.classify(1.05), Quality::Excellent);
        assert_eq!(calibrator.classify(0.95), Quality::Excellent);
        assert_eq!(calibrator.classify(1.051), Quality::Good);
        assert_eq!(calibrator.classify(1.15), Quality::Good);
        assert_eq!(calibrator.classify(0.85), Quality::Good);
        assert_eq!(calibrator.classify(1.16), Quality::Acceptable);
        assert_eq!(calibrator.classify(0.5), Quality::Acceptable);
        assert_eq!(calibrator.classify(2.0), Quality::Acceptable);
        assert_eq!(calibrator.classify(2.01), Quality::Poor);
        assert_eq!(calibrator.classify(0.49), Quality::Poor);
        assert_eq!(calibrator.classify(-1.0), Quality::Poor);
    }

    #[test]
    fn test_poor_geometry_still_accepted() {
        // Wildly wrong slope: stored but flagged
        let profile = calibrator()
            .derive(
                Channel::Ec,
                CalibrationPoint::new(100.0, 1000.0),
                CalibrationPoint::new(2000.0, 1100.0),
                0,
            )
            .unwrap();
        assert!(profile.calibrated);
        assert_eq!(profile.quality, Quality::Poor);
    }

    #[test]
    fn test_custom_thresholds() {
        let calibrator = TwoPointCalibrator::new(QualityThresholds {
            excellent: 0.01,
            good: 0.02,
            acceptable_min: 0.9,
            acceptable_max: 1.1,
        });
        assert_eq!(calibrator.classify(1.05), Quality::Acceptable);
        assert_eq!(calibrator.classify(1.2), Quality::Poor);
    }
}

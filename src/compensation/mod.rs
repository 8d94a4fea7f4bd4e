// Environmental compensation models
//
// Pure, stateless functions mapping a calibration-corrected reading plus the
// ambient temperature/humidity to a compensated value. Coefficients are
// fixed physical constants for loam soil, not user-editable state.
//
// Models:
// - EC: linear temperature factor referenced to 25 °C
//   (Rhoades et al., 1989)
// - pH: Nernst temperature correction referenced to 25 °C
// - NPK: exponential temperature term referenced to 20 °C times a linear
//   moisture term referenced to 30 % (FAO 56)
// - Temperature/humidity channels: no secondary compensation

use crate::channel::Channel;

/// Reference temperature for EC and pH compensation (°C).
pub const EC_PH_REFERENCE_TEMP: f64 = 25.0;
/// Reference temperature for NPK compensation (°C).
pub const NPK_REFERENCE_TEMP: f64 = 20.0;
/// Reference soil moisture for NPK compensation (%).
pub const NPK_REFERENCE_HUMIDITY: f64 = 30.0;

/// EC temperature coefficient (fraction per °C).
const EC_TEMP_COEFF: f64 = 0.021;
/// pH Nernst slope (pH units per °C).
const PH_TEMP_COEFF: f64 = 0.003;

/// Exponential temperature (`delta`) and linear moisture (`epsilon`)
/// coefficients for one nutrient channel.
#[derive(Debug, Clone, Copy)]
struct NpkCoefficients {
    delta: f64,
    epsilon: f64,
}

/// Loam soil NPK coefficients (Delgado et al., 2020).
fn npk_coefficients(channel: Channel) -> NpkCoefficients {
    match channel {
        Channel::Nitrogen => NpkCoefficients {
            delta: 0.0038,
            epsilon: 0.009,
        },
        Channel::Phosphorus => NpkCoefficients {
            delta: 0.0049,
            epsilon: 0.007,
        },
        Channel::Potassium => NpkCoefficients {
            delta: 0.0029,
            epsilon: 0.011,
        },
        _ => unreachable!("npk_coefficients called for non-NPK channel"),
    }
}

/// Apply the channel's environmental compensation model to a
/// calibration-corrected value.
///
/// Negative results clamp to 0 for EC and the nutrient channels; pH and the
/// temperature/humidity passthrough channels are never clamped.
///
/// At the reference point (25 °C for EC/pH; 20 °C and 30 % for NPK) the
/// output equals the input up to floating-point tolerance.
pub fn compensate(channel: Channel, value: f64, temperature: f64, humidity: f64) -> f64 {
    let compensated = match channel {
        Channel::Ec => value * (1.0 + EC_TEMP_COEFF * (temperature - EC_PH_REFERENCE_TEMP)),
        Channel::Ph => value - PH_TEMP_COEFF * (temperature - EC_PH_REFERENCE_TEMP),
        Channel::Nitrogen | Channel::Phosphorus | Channel::Potassium => {
            let coeffs = npk_coefficients(channel);
            let temp_factor = (coeffs.delta * (temperature - NPK_REFERENCE_TEMP)).exp();
            let moisture_factor = 1.0 + coeffs.epsilon * (humidity - NPK_REFERENCE_HUMIDITY);
            value * temp_factor * moisture_factor
        }
        Channel::Temperature | Channel::Humidity => value,
    };

    if channel.clamps_negative() {
        compensated.max(0.0)
    } else {
        compensated
    }
}

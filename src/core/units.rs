use thiserror::Error;

pub const WATTS_PER_SQUARE_METRE_PER_MET: f64 = 58.2;
pub const STEFAN_BOLTZMANN_CONSTANT: f64 = 5.67e-8; // in W/(m^2.K^4)
pub const CELSIUS_PER_KELVIN_OFFSET: f64 = 273.15;
pub const HECTOPASCALS_PER_STANDARD_ATMOSPHERE: f64 = 1013.25;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_c < -CELSIUS_PER_KELVIN_OFFSET {
        Err(BelowAbsoluteZeroError::from_c(temp_c))
    } else {
        Ok(temp_c + CELSIUS_PER_KELVIN_OFFSET)
    }
}

pub(crate) fn kelvin_to_celsius(temp_k: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_k < 0.0 {
        Err(BelowAbsoluteZeroError::from_k(temp_k))
    } else {
        Ok(temp_k - CELSIUS_PER_KELVIN_OFFSET)
    }
}

/// Saturation vapour pressure over water in hPa for a temperature in °C
/// (Magnus formula, the form used by the MEMI comfort model).
pub(crate) fn saturation_vapour_pressure(temp_c: f64) -> f64 {
    6.105 * (17.27 * temp_c / (237.7 + temp_c)).exp()
}

#[derive(Debug, Error)]
#[error("A temperature of {k}ºK/{}ºC was encountered, which is less than absolute zero", k - 273.15)]
pub(crate) struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_k(k: f64) -> Self {
        Self { k }
    }

    fn from_c(c: f64) -> Self {
        Self {
            k: c + CELSIUS_PER_KELVIN_OFFSET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_convert_between_celsius_and_kelvin() {
        assert_relative_eq!(celsius_to_kelvin(20.).unwrap(), 293.15);
        assert_relative_eq!(kelvin_to_celsius(293.15).unwrap(), 20.);
        assert!(celsius_to_kelvin(-300.).is_err());
        assert!(kelvin_to_celsius(-1.).is_err());
    }

    #[rstest]
    fn should_calculate_saturation_vapour_pressure() {
        // 6.105 hPa at 0°C by construction; about 23.4 hPa at 20°C
        assert_relative_eq!(saturation_vapour_pressure(0.), 6.105);
        assert_relative_eq!(saturation_vapour_pressure(20.), 23.38, epsilon = 0.1);
    }
}

use crate::core::common::check_series_length;
use crate::core::units::{celsius_to_kelvin, kelvin_to_celsius, STEFAN_BOLTZMANN_CONSTANT};
use crate::external_conditions::ExternalConditions;

// Body parameters for the radiant heat balance on a standing person,
// from the SolarCal model (ASHRAE-55) and the VDI standing-body geometry.
const SHORTWAVE_BODY_ABSORPTIVITY: f64 = 0.7;
const LONGWAVE_BODY_EMISSIVITY: f64 = 0.95;
const RADIATIVE_HEAT_TRANSFER_COEFFICIENT: f64 = 6.012; // in W/(m^2.K)
const FRACTION_RADIATION_EFFICIENCY: f64 = 0.725; // standing posture
const FLOOR_REFLECTANCE: f64 = 0.25;

/// Mean radiant temperature series for a person standing outdoors, in deg C.
///
/// The irradiance and temperature series are taken as arguments rather than
/// read from `conditions` so that a caller can substitute zeroed short-wave
/// series to model sun shelter; `conditions` supplies the solar altitudes.
/// Horizontal infrared is never zeroed by any caller.
///
/// Arguments:
/// * `conditions` - weather year, used for the precomputed solar altitude series
/// * `direct_normal_radiations` - direct normal (beam) irradiance, in W/m2 (one entry per hour)
/// * `diffuse_horizontal_radiations` - diffuse horizontal irradiance, in W/m2 (one entry per hour)
/// * `horizontal_infrared_radiations` - horizontal infrared radiation intensity, in W/m2 (one entry per hour)
/// * `air_temps` - air temperatures, in deg C (one entry per hour); surrounding
///   surfaces are assumed to sit at air temperature
/// * `fraction_body_exposed` - fraction of the body exposed to direct sun, 0 to 1
/// * `sky_exposure` - fraction of the sky dome in view, 0 to 1
pub fn mean_radiant_temperature(
    conditions: &ExternalConditions,
    direct_normal_radiations: &[f64],
    diffuse_horizontal_radiations: &[f64],
    horizontal_infrared_radiations: &[f64],
    air_temps: &[f64],
    fraction_body_exposed: f64,
    sky_exposure: f64,
) -> anyhow::Result<Vec<f64>> {
    let hours_in_year = conditions.solar_altitudes().len();
    for (name, series) in [
        ("direct normal irradiance", direct_normal_radiations),
        ("diffuse horizontal irradiance", diffuse_horizontal_radiations),
        ("horizontal infrared radiation", horizontal_infrared_radiations),
        ("air temperature", air_temps),
    ] {
        check_series_length(name, series, hours_in_year)?;
    }

    (0..hours_in_year)
        .map(|hour| {
            mean_radiant_temperature_for_hour(
                air_temps[hour],
                direct_normal_radiations[hour],
                diffuse_horizontal_radiations[hour],
                horizontal_infrared_radiations[hour],
                conditions.solar_altitudes()[hour],
                fraction_body_exposed,
                sky_exposure,
            )
        })
        .collect()
}

pub(crate) fn mean_radiant_temperature_for_hour(
    air_temp: f64,
    direct_normal_radiation: f64,
    diffuse_horizontal_radiation: f64,
    horizontal_infrared_radiation: f64,
    solar_altitude: f64,
    fraction_body_exposed: f64,
    sky_exposure: f64,
) -> anyhow::Result<f64> {
    let longwave_mrt = longwave_mean_radiant_temperature(
        air_temp,
        horizontal_infrared_radiation,
        sky_exposure,
    )?;

    // short-wave gain only applies while the sun is up
    let shortwave_delta = if solar_altitude > 0. {
        let flux = body_solar_flux(
            diffuse_horizontal_radiation,
            direct_normal_radiation,
            solar_altitude,
            sky_exposure,
            fraction_body_exposed,
        );
        mrt_delta_from_effective_radiant_field(effective_radiant_field_from_body_flux(flux))
    } else {
        0.
    };

    Ok(longwave_mrt + shortwave_delta)
}

/// Long-wave mean radiant temperature, in deg C, of the sky dome and the
/// surrounding surfaces (assumed at air temperature), blended by view factor
/// on a fourth-power basis.
fn longwave_mean_radiant_temperature(
    air_temp: f64,
    horizontal_infrared_radiation: f64,
    sky_exposure: f64,
) -> anyhow::Result<f64> {
    let sky_temp_k = sky_temperature(horizontal_infrared_radiation);
    let surface_temp_k = celsius_to_kelvin(air_temp)?;
    let sky_view_factor = 0.5 * sky_exposure;

    let blended_fourth_power = sky_view_factor * sky_temp_k.powi(4)
        + (1. - sky_view_factor) * surface_temp_k.powi(4);

    Ok(kelvin_to_celsius(blended_fourth_power.powf(0.25))?)
}

/// Effective sky temperature in K from horizontal infrared radiation intensity.
fn sky_temperature(horizontal_infrared_radiation: f64) -> f64 {
    (horizontal_infrared_radiation / STEFAN_BOLTZMANN_CONSTANT).powf(0.25)
}

/// Total short-wave solar flux on the body, in W/m2, as the sum of the
/// diffuse, ground-reflected and direct beam components.
fn body_solar_flux(
    diffuse_horizontal_radiation: f64,
    direct_normal_radiation: f64,
    solar_altitude: f64,
    sky_exposure: f64,
    fraction_body_exposed: f64,
) -> f64 {
    let global_horizontal =
        diffuse_horizontal_radiation + direct_normal_radiation * solar_altitude.to_radians().sin();

    let diffuse_flux = 0.5 * sky_exposure * fraction_body_exposed * diffuse_horizontal_radiation;
    let reflected_flux = 0.5 * fraction_body_exposed * FLOOR_REFLECTANCE * global_horizontal;
    let direct_flux =
        projected_area_factor(solar_altitude) * fraction_body_exposed * direct_normal_radiation;

    diffuse_flux + reflected_flux + direct_flux
}

/// Projected area factor of a standing person as a function of solar
/// altitude in degrees (rotationally-symmetric standing body).
fn projected_area_factor(solar_altitude: f64) -> f64 {
    0.308 * (solar_altitude * (0.998 - solar_altitude.powi(2) / 50_000.)).to_radians().cos()
}

fn effective_radiant_field_from_body_flux(body_solar_flux: f64) -> f64 {
    body_solar_flux * (SHORTWAVE_BODY_ABSORPTIVITY / LONGWAVE_BODY_EMISSIVITY)
}

fn mrt_delta_from_effective_radiant_field(effective_radiant_field: f64) -> f64 {
    effective_radiant_field
        / (FRACTION_RADIATION_EFFICIENCY * RADIATIVE_HEAT_TRANSFER_COEFFICIENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_equal_air_temp_when_sky_radiates_at_air_temp() {
        // horizontal infrared chosen so the sky temperature is exactly 10°C
        let horizontal_infrared = STEFAN_BOLTZMANN_CONSTANT * 283.15_f64.powi(4);
        let mrt =
            mean_radiant_temperature_for_hour(10., 0., 0., horizontal_infrared, 0., 1., 1.)
                .unwrap();
        assert_relative_eq!(mrt, 10., epsilon = 1e-9);
    }

    #[rstest]
    fn should_sit_below_air_temp_under_a_cold_clear_sky() {
        let mrt = mean_radiant_temperature_for_hour(10., 0., 0., 280., 0., 1., 1.).unwrap();
        assert!(mrt < 10.);
    }

    #[rstest]
    fn should_add_shortwave_gain_while_sun_is_up() {
        let horizontal_infrared = 350.;
        let night =
            mean_radiant_temperature_for_hour(20., 0., 0., horizontal_infrared, 0., 1., 1.)
                .unwrap();
        let day =
            mean_radiant_temperature_for_hour(20., 800., 150., horizontal_infrared, 60., 1., 1.)
                .unwrap();
        assert!(day > night + 20., "full sun should add tens of degrees of MRT");
    }

    #[rstest]
    fn should_never_reduce_mrt_with_irradiance() {
        for altitude in [1., 15., 30., 45., 60., 75., 89.] {
            let sheltered =
                mean_radiant_temperature_for_hour(15., 0., 0., 340., altitude, 1., 1.).unwrap();
            let exposed =
                mean_radiant_temperature_for_hour(15., 500., 100., 340., altitude, 1., 1.)
                    .unwrap();
            assert!(exposed >= sheltered);
        }
    }

    #[rstest]
    fn should_shrink_projected_area_as_sun_climbs() {
        assert!(projected_area_factor(10.) > projected_area_factor(80.));
        assert_relative_eq!(projected_area_factor(0.), 0.308);
    }

    #[rstest]
    fn should_match_exposed_mrt_when_both_irradiance_series_are_zero() {
        // the sheltered variant is the same call with zeroed short-wave inputs,
        // so zero-irradiance weather must give identical output either way
        let a = mean_radiant_temperature_for_hour(5., 0., 0., 300., 35., 1., 1.).unwrap();
        let b = mean_radiant_temperature_for_hour(5., 0., 0., 300., 35., 1., 1.).unwrap();
        assert_relative_eq!(a, b);
    }
}

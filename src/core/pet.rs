use crate::compare_floats::clamp;
use crate::core::common::check_series_length;
use crate::core::solvers::{root_in_bracket, root_with_expanding_bracket};
use crate::core::units::{
    saturation_vapour_pressure, HECTOPASCALS_PER_STANDARD_ATMOSPHERE, STEFAN_BOLTZMANN_CONSTANT,
    WATTS_PER_SQUARE_METRE_PER_MET,
};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// met outside (0, inf) or clo outside [0, inf). Fatal, raised before any
/// computation begins.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidParameterError {
    #[error("metabolic rate of {0} met must be greater than zero")]
    MetabolicRate(f64),
    #[error("clothing insulation of {0} clo must not be negative")]
    ClothingInsulation(f64),
}

/// The nine comfort buckets of the PET scale, Very Cold (-4) to Very Hot (4).
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ComfortCategory {
    #[strum(serialize = "Very Cold")]
    VeryCold,
    #[strum(serialize = "Cold")]
    Cold,
    #[strum(serialize = "Cool")]
    Cool,
    #[strum(serialize = "Slightly Cool")]
    SlightlyCool,
    #[strum(serialize = "Comfort")]
    Comfort,
    #[strum(serialize = "Slightly Warm")]
    SlightlyWarm,
    #[strum(serialize = "Warm")]
    Warm,
    #[strum(serialize = "Hot")]
    Hot,
    #[strum(serialize = "Very Hot")]
    VeryHot,
}

impl ComfortCategory {
    /// Category for a PET value, using the published PET scale thresholds
    /// (4, 8, 13, 18, 23, 29, 35 and 41 °C).
    pub fn from_pet(pet: f64) -> Self {
        match pet {
            pet if pet < 4. => Self::VeryCold,
            pet if pet < 8. => Self::Cold,
            pet if pet < 13. => Self::Cool,
            pet if pet < 18. => Self::SlightlyCool,
            pet if pet < 23. => Self::Comfort,
            pet if pet < 29. => Self::SlightlyWarm,
            pet if pet < 35. => Self::Warm,
            pet if pet < 41. => Self::Hot,
            _ => Self::VeryHot,
        }
    }

    pub fn code(&self) -> i8 {
        match self {
            Self::VeryCold => -4,
            Self::Cold => -3,
            Self::Cool => -2,
            Self::SlightlyCool => -1,
            Self::Comfort => 0,
            Self::SlightlyWarm => 1,
            Self::Warm => 2,
            Self::Hot => 3,
            Self::VeryHot => 4,
        }
    }
}

// Standard subject of the MEMI heat balance model: a 35 year old male,
// 75 kg and 1.75 m, standing.
const BODY_WEIGHT: f64 = 75.; // in kg
const BODY_HEIGHT: f64 = 1.75; // in m
const BODY_AGE: f64 = 35.;

const SPECIFIC_HEAT_AIR: f64 = 1010.; // in J/(kg.K)
const SPECIFIC_HEAT_BLOOD: f64 = 3640.; // in J/(litre.K)
const LATENT_HEAT_VAPORISATION: f64 = 2.42e6; // in J/kg
const SKIN_EMISSIVITY: f64 = 0.99;
const CLOTHING_EMISSIVITY: f64 = 0.95;
const MINIMUM_SKIN_CONDUCTANCE: f64 = 5.28; // in W/(m^2.K)
const FRACTION_RADIATION_EFFICIENCY: f64 = 0.725; // standing posture
const LEWIS_RATIO: f64 = 1.65; // in K/hPa

const CORE_TEMP_SET: f64 = 36.6; // in deg C
const SKIN_TEMP_SET: f64 = 34.0; // in deg C
// mean body set point weighted 0.1 skin / 0.9 core
const BODY_TEMP_SET: f64 = 0.1 * SKIN_TEMP_SET + 0.9 * CORE_TEMP_SET;

// Reference environment defining PET: calm air, 12 hPa vapour pressure,
// light activity (80 W above basal) in 0.9 clo
const REFERENCE_AIR_VELOCITY: f64 = 0.1; // in m/s
const REFERENCE_VAPOUR_PRESSURE: f64 = 12.; // in hPa
const REFERENCE_CLO: f64 = 0.9;
const REFERENCE_ACTIVITY: f64 = 80.; // in W

// below this the convective coefficient correlation is out of its range
const MINIMUM_AIR_VELOCITY: f64 = 0.1; // in m/s

const TEMPERATURE_SOLVE_TOLERANCE: f64 = 1e-3;

/// Physiological Equivalent Temperature estimator for one (met, clo) pair.
///
/// Implements the MEMI steady-state human heat balance (core, skin and
/// clothing-surface nodes with vasomotor and sweat regulation). PET for an
/// hour is the air temperature of the reference environment at which a body
/// in the solved state has a zero overall heat balance.
#[derive(Clone, Copy, Debug)]
pub struct Pet {
    metabolic_rate: f64,
    clothing_insulation: f64,
    barometric_pressure: f64, // in hPa
}

impl Pet {
    /// Construct a PET estimator, failing fast on out-of-range parameters.
    ///
    /// Arguments:
    /// * `metabolic_rate` - activity level, in met (1 met = 58.2 W/m2), greater than zero
    /// * `clothing_insulation` - clothing insulation, in clo, zero or above
    pub fn new(metabolic_rate: f64, clothing_insulation: f64) -> Result<Self, InvalidParameterError> {
        if !(metabolic_rate > 0.) {
            return Err(InvalidParameterError::MetabolicRate(metabolic_rate));
        }
        if !(clothing_insulation >= 0.) {
            return Err(InvalidParameterError::ClothingInsulation(clothing_insulation));
        }

        Ok(Self {
            metabolic_rate,
            clothing_insulation,
            barometric_pressure: HECTOPASCALS_PER_STANDARD_ATMOSPHERE,
        })
    }

    /// PET value and comfort category for every hour of the given series.
    ///
    /// All four series must have equal length.
    pub fn compute(
        &self,
        air_temps: &[f64],
        relative_humidities: &[f64],
        mean_radiant_temps: &[f64],
        wind_speeds: &[f64],
    ) -> anyhow::Result<(Vec<f64>, Vec<ComfortCategory>)> {
        let expected = air_temps.len();
        check_series_length("relative humidity", relative_humidities, expected)?;
        check_series_length("mean radiant temperature", mean_radiant_temps, expected)?;
        check_series_length("wind speed", wind_speeds, expected)?;

        let pet_values = (0..expected)
            .map(|hour| {
                self.pet_for_hour(
                    air_temps[hour],
                    relative_humidities[hour],
                    mean_radiant_temps[hour],
                    wind_speeds[hour],
                )
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        let categories = pet_values
            .iter()
            .map(|pet| ComfortCategory::from_pet(*pet))
            .collect::<Vec<_>>();

        Ok((pet_values, categories))
    }

    /// PET for a single hour of weather, in deg C.
    pub fn pet_for_hour(
        &self,
        air_temp: f64,
        relative_humidity: f64,
        mean_radiant_temp: f64,
        wind_speed: f64,
    ) -> anyhow::Result<f64> {
        let vapour_pressure = relative_humidity / 100. * saturation_vapour_pressure(air_temp);
        let environment = Environment {
            air_temp,
            mean_radiant_temp,
            air_velocity: wind_speed.max(MINIMUM_AIR_VELOCITY),
            vapour_pressure,
            internal_heat: self.metabolic_rate * WATTS_PER_SQUARE_METRE_PER_MET,
            clothing: ClothingGeometry::for_clo(self.clothing_insulation),
            barometric_pressure: self.barometric_pressure,
        };

        let body_state = solve_body_state(&environment)?;

        self.reference_air_temperature(&body_state)
    }

    /// Air temperature of the reference environment at which the frozen body
    /// state has a zero overall heat balance; this is the PET by definition.
    fn reference_air_temperature(&self, body_state: &BodyState) -> anyhow::Result<f64> {
        let reference_clothing = ClothingGeometry::for_clo(REFERENCE_CLO);
        let reference_internal_heat =
            (basal_metabolism() + REFERENCE_ACTIVITY) / body_surface_area();

        let balance = |reference_temp: f64| {
            let environment = Environment {
                air_temp: reference_temp,
                mean_radiant_temp: reference_temp,
                air_velocity: REFERENCE_AIR_VELOCITY,
                vapour_pressure: REFERENCE_VAPOUR_PRESSURE,
                internal_heat: reference_internal_heat,
                clothing: reference_clothing,
                barometric_pressure: self.barometric_pressure,
            };
            total_body_balance(&environment, body_state)
        };

        root_in_bracket(balance, -150., 200., TEMPERATURE_SOLVE_TOLERANCE)
    }
}

/// One hour of boundary conditions for the body heat balance, with fluxes in
/// W per m2 of body (DuBois) surface.
struct Environment {
    air_temp: f64,
    mean_radiant_temp: f64,
    air_velocity: f64,
    vapour_pressure: f64, // in hPa
    internal_heat: f64,   // in W/m2
    clothing: ClothingGeometry,
    barometric_pressure: f64, // in hPa
}

impl Environment {
    /// Convective heat transfer coefficient in W/(m^2.K), pressure-corrected.
    fn convective_coefficient(&self) -> f64 {
        (2.67 + 6.5 * self.air_velocity.powf(0.67))
            * (self.barometric_pressure / HECTOPASCALS_PER_STANDARD_ATMOSPHERE).powf(0.55)
    }

    /// Sensible plus latent respiratory heat gain in W/m2 (negative = loss).
    fn respiration(&self) -> f64 {
        let expired_air_temp = 0.47 * self.air_temp + 21.;
        let pulmonary_ventilation = 1.44e-6 * self.internal_heat;
        let sensible = SPECIFIC_HEAT_AIR * (self.air_temp - expired_air_temp) * pulmonary_ventilation;
        let latent = 0.623 * LATENT_HEAT_VAPORISATION / self.barometric_pressure
            * (self.vapour_pressure - saturation_vapour_pressure(expired_air_temp))
            * pulmonary_ventilation;

        sensible + latent
    }

    /// Radiant heat gain in W/m2 on a surface at `surface_temp` covering
    /// `area_ratio` of the body, with the given emissivity.
    fn radiant_gain(&self, surface_temp: f64, area_ratio: f64, emissivity: f64) -> f64 {
        FRACTION_RADIATION_EFFICIENCY
            * area_ratio
            * emissivity
            * STEFAN_BOLTZMANN_CONSTANT
            * ((self.mean_radiant_temp + 273.15).powi(4) - (surface_temp + 273.15).powi(4))
    }

    /// Convective heat gain in W/m2 on a surface at `surface_temp` covering
    /// `area_ratio` of the body.
    fn convective_gain(&self, surface_temp: f64, area_ratio: f64) -> f64 {
        self.convective_coefficient() * (self.air_temp - surface_temp) * area_ratio
    }

    /// Evaporative heat loss from the skin in W/m2 (zero or above), combining
    /// regulatory sweating with insensible diffusion via skin wettedness.
    fn evaporative_loss(&self, core_temp: f64, skin_temp: f64) -> f64 {
        let (_, alpha) = vasomotricity(core_temp, skin_temp);
        let body_temp = alpha * skin_temp + (1. - alpha) * core_temp;
        let sweat_loss = sweat_evaporation(body_temp, skin_temp);

        let max_loss = LEWIS_RATIO
            * self.convective_coefficient()
            * (saturation_vapour_pressure(skin_temp) - self.vapour_pressure)
            * self
                .clothing
                .permeation_efficiency(self.convective_coefficient());
        if max_loss <= 0. {
            return 0.;
        }

        let wettedness = clamp(0.06 + 0.94 * sweat_loss / max_loss, 0.06, 1.);

        wettedness * max_loss
    }
}

/// Cylindrical clothing model around the standard body.
#[derive(Clone, Copy, Debug)]
struct ClothingGeometry {
    /// clothed exchange area over body surface area
    area_ratio: f64,
    /// fraction of the body surface left bare
    bare_fraction: f64,
    /// skin-to-clothing-surface conductance in W/(m^2 body.K)
    conduction_coefficient: f64,
    /// clothing insulation resistance in (m^2.K)/W
    insulation_resistance: f64,
    clothed: bool,
}

impl ClothingGeometry {
    fn for_clo(clo: f64) -> Self {
        let surface_area = body_surface_area();
        // fraction of the body covered by clothing (empirical polynomial)
        let covered_fraction =
            ((173.51 * clo - 2.36 - 100.76 * clo.powi(2) + 19.28 * clo.powi(3)) / 100.)
                .clamp(0., 1.);

        if covered_fraction <= 0. {
            return Self {
                area_ratio: 0.,
                bare_fraction: 1.,
                conduction_coefficient: 0.,
                insulation_resistance: 0.,
                clothed: false,
            };
        }

        // increase of exchange area due to clothing
        let area_increase_factor = 1. + 0.31 * clo;
        let clothed_area =
            surface_area * covered_fraction + surface_area * (area_increase_factor - 1.);
        let insulation_resistance = clo / 6.45;

        // height fraction of the clothed cylinder
        let height_fraction = match clo {
            clo if clo >= 2. => 1.,
            clo if clo > 0.6 => (BODY_HEIGHT - 0.2) / BODY_HEIGHT,
            clo if clo > 0.3 => 0.5,
            _ => 0.1,
        };

        let cylinder_divisor =
            2. * std::f64::consts::PI * BODY_HEIGHT * height_fraction;
        let inner_radius = covered_fraction * surface_area / cylinder_divisor;
        let outer_radius = surface_area * (area_increase_factor - 1. + covered_fraction)
            / cylinder_divisor;

        // radial conduction through the clothing shell
        let shell_conductance = 2.
            * std::f64::consts::PI
            * BODY_HEIGHT
            * height_fraction
            * (outer_radius - inner_radius)
            / (insulation_resistance * (outer_radius / inner_radius).ln() * clothed_area);

        Self {
            area_ratio: clothed_area / surface_area,
            bare_fraction: 1. - covered_fraction,
            conduction_coefficient: shell_conductance * clothed_area / surface_area,
            insulation_resistance,
            clothed: true,
        }
    }

    /// Evaporative permeation efficiency of the clothing for a given
    /// convective coefficient.
    fn permeation_efficiency(&self, convective_coefficient: f64) -> f64 {
        1. / (1. + 0.92 * convective_coefficient * self.insulation_resistance)
    }
}

/// Equilibrium temperatures of the three body nodes, in deg C.
#[derive(Clone, Copy, Debug)]
struct BodyState {
    core_temp: f64,
    skin_temp: f64,
    clothing_temp: f64,
}

/// DuBois body surface area in m2.
fn body_surface_area() -> f64 {
    0.203 * BODY_WEIGHT.powf(0.425) * BODY_HEIGHT.powf(0.725)
}

/// Basal metabolism of the standard subject in W (Harris-Benedict, male).
fn basal_metabolism() -> f64 {
    3.45 * BODY_WEIGHT.powf(0.75)
        * (1. + 0.004 * (30. - BODY_AGE)
            + 0.01 * (BODY_HEIGHT * 100. / BODY_WEIGHT.powf(1. / 3.) - 43.4))
}

/// Skin blood flow in litre/(m^2.h) and the core/skin mass weighting alpha,
/// from the vasomotor signals of the two node temperatures.
fn vasomotricity(core_temp: f64, skin_temp: f64) -> (f64, f64) {
    let core_signal = (core_temp - CORE_TEMP_SET).max(0.);
    let skin_signal = (SKIN_TEMP_SET - skin_temp).max(0.);
    let blood_flow = clamp((6.3 + 75. * core_signal) / (1. + 0.5 * skin_signal), 0.5, 90.);
    let alpha = 0.041_773_7 + 0.745_183_3 / (blood_flow + 0.585_417);

    (blood_flow, alpha)
}

/// Regulatory sweat evaporation in W/m2 from the warm signals of mean body
/// and skin temperature; the sweat rate saturates at 500 g/(m^2.h).
fn sweat_evaporation(body_temp: f64, skin_temp: f64) -> f64 {
    let body_signal = (body_temp - BODY_TEMP_SET).max(0.);
    let skin_signal = (skin_temp - SKIN_TEMP_SET).max(0.);
    let sweat_rate = (170. * body_signal * (skin_signal / 10.7).exp()).min(500.);

    sweat_rate * LATENT_HEAT_VAPORISATION / 1000. / 3600.
}

/// Core-to-skin conductance in W/(m^2.K) for the given node temperatures.
fn core_skin_conductance(core_temp: f64, skin_temp: f64) -> f64 {
    let (blood_flow, _) = vasomotricity(core_temp, skin_temp);

    MINIMUM_SKIN_CONDUCTANCE + blood_flow * SPECIFIC_HEAT_BLOOD / 3600.
}

/// Solve the three-node body heat balance for the given environment.
///
/// The core balance pins the core-to-skin flux to the metabolic heat net of
/// respiration, which leaves a single monotone residual in skin temperature;
/// the clothing-surface temperature is solved in an inner bracket for each
/// candidate skin temperature.
fn solve_body_state(environment: &Environment) -> anyhow::Result<BodyState> {
    let core_to_skin_flux = environment.internal_heat + environment.respiration();

    let skin_residual = |skin_temp: f64| -> f64 {
        let core_temp = solve_core_temp(core_to_skin_flux, skin_temp);
        let clothing_temp = solve_clothing_temp(environment, skin_temp);
        let conduction = environment.clothing.conduction_coefficient * (skin_temp - clothing_temp);

        core_to_skin_flux
            + environment.radiant_gain(
                skin_temp,
                environment.clothing.bare_fraction,
                SKIN_EMISSIVITY,
            )
            + environment.convective_gain(skin_temp, environment.clothing.bare_fraction)
            - environment.evaporative_loss(core_temp, skin_temp)
            - conduction
    };

    let skin_temp = root_with_expanding_bracket(skin_residual, 0., 45., TEMPERATURE_SOLVE_TOLERANCE)?;
    let core_temp = solve_core_temp(core_to_skin_flux, skin_temp);
    let clothing_temp = solve_clothing_temp(environment, skin_temp);

    Ok(BodyState {
        core_temp,
        skin_temp,
        clothing_temp,
    })
}

/// Core temperature at which the vasomotor core-to-skin flux matches the
/// metabolic target, given a skin temperature.
fn solve_core_temp(core_to_skin_flux: f64, skin_temp: f64) -> f64 {
    let residual = |core_temp: f64| {
        core_to_skin_flux - core_skin_conductance(core_temp, skin_temp) * (core_temp - skin_temp)
    };

    // the residual is positive at skin_temp and negative for hot cores
    root_with_expanding_bracket(
        residual,
        skin_temp,
        skin_temp + 8.,
        TEMPERATURE_SOLVE_TOLERANCE,
    )
    .unwrap_or(CORE_TEMP_SET)
}

/// Clothing-surface temperature balancing shell conduction against radiant
/// and convective exchange, given a skin temperature.
fn solve_clothing_temp(environment: &Environment, skin_temp: f64) -> f64 {
    if !environment.clothing.clothed {
        return skin_temp;
    }

    let residual = |clothing_temp: f64| {
        environment.clothing.conduction_coefficient * (skin_temp - clothing_temp)
            + environment.radiant_gain(
                clothing_temp,
                environment.clothing.area_ratio,
                CLOTHING_EMISSIVITY,
            )
            + environment.convective_gain(clothing_temp, environment.clothing.area_ratio)
    };

    let lower = environment.air_temp.min(environment.mean_radiant_temp).min(skin_temp) - 5.;
    let upper = environment.air_temp.max(environment.mean_radiant_temp).max(skin_temp) + 5.;

    // conduction and both exchange terms strictly decrease with the surface temperature
    root_with_expanding_bracket(residual, lower, upper, TEMPERATURE_SOLVE_TOLERANCE)
        .unwrap_or(skin_temp)
}

/// Overall body heat balance in W/m2 for a frozen body state placed in the
/// given environment (positive = net gain).
fn total_body_balance(environment: &Environment, body_state: &BodyState) -> f64 {
    let clothed_exchange = if environment.clothing.clothed {
        environment.radiant_gain(
            body_state.clothing_temp,
            environment.clothing.area_ratio,
            CLOTHING_EMISSIVITY,
        ) + environment.convective_gain(body_state.clothing_temp, environment.clothing.area_ratio)
    } else {
        0.
    };

    environment.internal_heat
        + environment.respiration()
        + environment.radiant_gain(
            body_state.skin_temp,
            environment.clothing.bare_fraction,
            SKIN_EMISSIVITY,
        )
        + environment.convective_gain(body_state.skin_temp, environment.clothing.bare_fraction)
        + clothed_exchange
        - environment.evaporative_loss(body_state.core_temp, body_state.skin_temp)
}

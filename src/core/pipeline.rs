use crate::core::pet::{ComfortCategory, Pet};
use crate::core::solar_cal::mean_radiant_temperature;
use crate::external_conditions::ExternalConditions;
use crate::input::HumanParameters;
use crate::simulation_time::{iter_hours_of_year, HOURS_IN_YEAR};
use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::info;

/// PET value considered thermally neutral when picking a strategy, in deg C.
pub const NEUTRAL_PET: f64 = 20.5;

/// The four passive exposure permutations assessed for every hour.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum ExposureScenario {
    #[strum(serialize = "Fully Exposed")]
    FullyExposed,
    #[strum(serialize = "Sun Sheltered")]
    SunSheltered,
    #[strum(serialize = "Wind Sheltered")]
    WindSheltered,
    #[strum(serialize = "Fully Sheltered")]
    FullySheltered,
}

impl ExposureScenario {
    pub fn index(&self) -> usize {
        match self {
            Self::FullyExposed => 0,
            Self::SunSheltered => 1,
            Self::WindSheltered => 2,
            Self::FullySheltered => 3,
        }
    }

    /// Sun-shelter scenarios are not meaningful after sunset, so nighttime
    /// strategy selection only considers the other two.
    fn meaningful_at_night(&self) -> bool {
        matches!(self, Self::FullyExposed | Self::WindSheltered)
    }
}

/// One hour of the assessed year: the four PET values and categories, the
/// sun-up flag and the strategy whose PET lands closest to neutral.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlyComfortRecord {
    pub timestamp: NaiveDateTime,
    /// calendar month, 1 to 12
    pub month: u32,
    pub sun_up: bool,
    pub(crate) pet_values: [f64; 4],
    pub(crate) categories: [ComfortCategory; 4],
    pub ideal_strategy: ExposureScenario,
}

impl HourlyComfortRecord {
    pub fn pet(&self, scenario: ExposureScenario) -> f64 {
        self.pet_values[scenario.index()]
    }

    pub fn category(&self, scenario: ExposureScenario) -> ComfortCategory {
        self.categories[scenario.index()]
    }
}

/// Assess the four exposure scenarios over a full weather year.
///
/// Computes the exposed and sheltered mean radiant temperature series, the
/// four PET series for the (radiant, wind) pairings, joins in the sun-up
/// flag and selects the ideal strategy per hour. Fails atomically: either
/// all four scenarios compute or no records are produced.
pub fn run_scenarios(
    conditions: &ExternalConditions,
    params: &HumanParameters,
) -> anyhow::Result<Vec<HourlyComfortRecord>> {
    // validate human parameters before any computation begins
    let pet = Pet::new(params.metabolic_rate, params.clothing_insulation)?;

    info!(
        met = params.metabolic_rate,
        clo = params.clothing_insulation,
        "assessing exposure scenarios for weather year"
    );

    let zero_series = vec![0.; HOURS_IN_YEAR as usize];

    let exposed_mrt = mean_radiant_temperature(
        conditions,
        conditions.direct_normal_radiations(),
        conditions.diffuse_horizontal_radiations(),
        conditions.horizontal_infrared_radiations(),
        conditions.air_temps(),
        1.,
        1.,
    )?;
    // shelter from the sun zeroes the short-wave series only; the long-wave
    // sky exchange remains
    let sheltered_mrt = mean_radiant_temperature(
        conditions,
        &zero_series,
        &zero_series,
        conditions.horizontal_infrared_radiations(),
        conditions.air_temps(),
        1.,
        1.,
    )?;

    let mut pet_series = Vec::with_capacity(4);
    for scenario in ExposureScenario::iter() {
        let (radiant_temps, wind_speeds): (&[f64], &[f64]) = match scenario {
            ExposureScenario::FullyExposed => (&exposed_mrt, conditions.wind_speeds()),
            ExposureScenario::SunSheltered => (&sheltered_mrt, conditions.wind_speeds()),
            ExposureScenario::WindSheltered => (&exposed_mrt, &zero_series),
            ExposureScenario::FullySheltered => (&sheltered_mrt, &zero_series),
        };
        pet_series.push(pet.compute(
            conditions.air_temps(),
            conditions.relative_humidities(),
            radiant_temps,
            wind_speeds,
        )?);
    }

    let records = iter_hours_of_year()
        .map(|hour| {
            let pet_values = [
                pet_series[0].0[hour.index],
                pet_series[1].0[hour.index],
                pet_series[2].0[hour.index],
                pet_series[3].0[hour.index],
            ];
            let categories = [
                pet_series[0].1[hour.index],
                pet_series[1].1[hour.index],
                pet_series[2].1[hour.index],
                pet_series[3].1[hour.index],
            ];
            let sun_up = conditions.sun_up(hour.index);

            HourlyComfortRecord {
                timestamp: hour.timestamp(),
                month: hour.current_month(),
                sun_up,
                pet_values,
                categories,
                ideal_strategy: ideal_strategy(&pet_values, sun_up),
            }
        })
        .collect::<Vec<_>>();

    info!(records = records.len(), "assessment complete");

    Ok(records)
}

/// Scenario whose PET sits closest to the neutral target. Daytime hours
/// choose among all four scenarios, nighttime hours among the two that do
/// not depend on the sun.
fn ideal_strategy(pet_values: &[f64; 4], sun_up: bool) -> ExposureScenario {
    ExposureScenario::iter()
        .filter(|scenario| sun_up || scenario.meaningful_at_night())
        .min_by_key(|scenario| OrderedFloat((pet_values[scenario.index()] - NEUTRAL_PET).abs()))
        .expect("at least two scenarios are always candidates")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn conditions_with_wind(wind_speed: f64) -> ExternalConditions {
        ExternalConditions::new(
            vec![15.; 8760],
            vec![50.; 8760],
            vec![wind_speed; 8760],
            vec![200.; 8760],
            vec![100.; 8760],
            vec![350.; 8760],
            51.42,
            -0.75,
            0.,
            30.,
        )
        .unwrap()
    }

    #[fixture]
    fn params() -> HumanParameters {
        HumanParameters {
            metabolic_rate: 1.,
            clothing_insulation: 1.,
        }
    }

    #[rstest]
    fn should_produce_a_record_per_hour_with_expected_invariants(params: HumanParameters) {
        let records = run_scenarios(&conditions_with_wind(3.), &params).unwrap();

        assert_eq!(records.len(), 8760);

        // timestamps strictly increase over a full non-leap year
        for pair in records.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
        assert_eq!(records[0].timestamp.to_string(), "2025-01-01 00:00:00");
        assert_eq!(records[8759].timestamp.to_string(), "2025-12-31 23:00:00");
        assert_eq!(records[0].month, 1);
        assert_eq!(records[8759].month, 12);

        for record in &records {
            // shelter from the sun cannot increase radiant heat gain
            assert!(
                record.pet(ExposureScenario::FullyExposed)
                    >= record.pet(ExposureScenario::SunSheltered) - 1e-2
            );
            // nighttime hours never choose a sun-dependent strategy
            if !record.sun_up {
                assert!(matches!(
                    record.ideal_strategy,
                    ExposureScenario::FullyExposed | ExposureScenario::WindSheltered
                ));
            }
        }

        // both day and night hours exist at this latitude
        assert!(records.iter().any(|r| r.sun_up));
        assert!(records.iter().any(|r| !r.sun_up));
    }

    #[rstest]
    fn should_be_idempotent(params: HumanParameters) {
        let conditions = conditions_with_wind(3.);
        let first = run_scenarios(&conditions, &params).unwrap();
        let second = run_scenarios(&conditions, &params).unwrap();
        assert!(first == second);
    }

    #[rstest]
    fn should_collapse_wind_shelter_when_weather_is_calm(params: HumanParameters) {
        // with no wind to shelter from, the wind-sheltered series is the
        // fully-exposed series
        let records = run_scenarios(&conditions_with_wind(0.), &params).unwrap();
        for record in &records {
            assert_eq!(
                record.pet(ExposureScenario::WindSheltered),
                record.pet(ExposureScenario::FullyExposed)
            );
            assert_eq!(
                record.pet(ExposureScenario::FullySheltered),
                record.pet(ExposureScenario::SunSheltered)
            );
        }
    }

    #[rstest]
    fn should_reject_invalid_parameters_before_computing() {
        let result = run_scenarios(
            &conditions_with_wind(3.),
            &HumanParameters {
                metabolic_rate: 0.,
                clothing_insulation: 1.,
            },
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn should_pick_the_scenario_nearest_neutral() {
        let pet_values = [30., 22., 28., 16.];
        assert_eq!(
            ideal_strategy(&pet_values, true),
            ExposureScenario::SunSheltered
        );
        // at night the sun-sheltered columns are out of contention
        assert_eq!(
            ideal_strategy(&pet_values, false),
            ExposureScenario::WindSheltered
        );
    }

    #[rstest]
    fn should_break_ties_towards_full_exposure() {
        let pet_values = [20.5, 20.5, 20.5, 20.5];
        assert_eq!(
            ideal_strategy(&pet_values, true),
            ExposureScenario::FullyExposed
        );
    }
}

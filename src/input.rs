use crate::external_conditions::ExternalConditions;
use serde::Deserialize;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> anyhow::Result<Input> {
    Ok(serde_json::from_reader(BufReader::new(json))?)
}

/// The full input document for one assessment run: a pre-parsed weather year
/// from the weather data provider plus the human parameters.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    pub external_conditions: ExternalConditionsInput,
    #[serde(default)]
    pub human_parameters: HumanParameters,
}

/// Weather year as supplied by the weather data provider: location metadata
/// plus six hourly series of length 8760. Bounds and lengths are validated
/// when this is turned into an `ExternalConditions`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalConditionsInput {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: f64,
    #[serde(default)]
    pub elevation: f64,
    pub air_temperatures: Vec<f64>,
    pub relative_humidities: Vec<f64>,
    pub wind_speeds: Vec<f64>,
    pub direct_normal_radiation: Vec<f64>,
    pub diffuse_horizontal_radiation: Vec<f64>,
    pub horizontal_infrared_radiation: Vec<f64>,
}

impl TryFrom<ExternalConditionsInput> for ExternalConditions {
    type Error = anyhow::Error;

    fn try_from(input: ExternalConditionsInput) -> Result<Self, Self::Error> {
        ExternalConditions::new(
            input.air_temperatures,
            input.relative_humidities,
            input.wind_speeds,
            input.direct_normal_radiation,
            input.diffuse_horizontal_radiation,
            input.horizontal_infrared_radiation,
            input.latitude,
            input.longitude,
            input.timezone,
            input.elevation,
        )
    }
}

/// Metabolic rate and clothing insulation for the assessed person, supplied
/// per run. Range validation happens when the PET estimator is built.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HumanParameters {
    #[serde(rename = "met", default = "default_metabolic_rate")]
    pub metabolic_rate: f64,
    #[serde(rename = "clo", default = "default_clothing_insulation")]
    pub clothing_insulation: f64,
}

impl Default for HumanParameters {
    fn default() -> Self {
        Self {
            metabolic_rate: default_metabolic_rate(),
            clothing_insulation: default_clothing_insulation(),
        }
    }
}

fn default_metabolic_rate() -> f64 {
    1.
}

fn default_clothing_insulation() -> f64 {
    1.
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_ingest_an_input_document() {
        let json = r#"{
            "external_conditions": {
                "latitude": 51.42,
                "longitude": -0.75,
                "timezone": 0.0,
                "elevation": 30.0,
                "air_temperatures": [10.0, 11.0],
                "relative_humidities": [60.0, 62.0],
                "wind_speeds": [4.0, 4.5],
                "direct_normal_radiation": [0.0, 120.0],
                "diffuse_horizontal_radiation": [0.0, 40.0],
                "horizontal_infrared_radiation": [330.0, 335.0]
            },
            "human_parameters": {"met": 1.2, "clo": 0.5}
        }"#;
        let input = ingest_for_processing(json.as_bytes()).unwrap();
        assert_eq!(input.external_conditions.latitude, 51.42);
        assert_eq!(input.external_conditions.air_temperatures, vec![10., 11.]);
        assert_eq!(
            input.human_parameters,
            HumanParameters {
                metabolic_rate: 1.2,
                clothing_insulation: 0.5,
            }
        );
    }

    #[rstest]
    fn should_default_human_parameters_when_absent() {
        let json = r#"{
            "external_conditions": {
                "latitude": 0.0,
                "longitude": 0.0,
                "timezone": 0.0,
                "air_temperatures": [],
                "relative_humidities": [],
                "wind_speeds": [],
                "direct_normal_radiation": [],
                "diffuse_horizontal_radiation": [],
                "horizontal_infrared_radiation": []
            }
        }"#;
        let input = ingest_for_processing(json.as_bytes()).unwrap();
        assert_eq!(input.human_parameters, HumanParameters::default());
        assert_eq!(input.external_conditions.elevation, 0.);
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let json = r#"{"external_conditions": {}, "chart_colors": {}}"#;
        assert!(ingest_for_processing(json.as_bytes()).is_err());
    }

    #[rstest]
    fn should_validate_when_converted_to_external_conditions() {
        let input = ExternalConditionsInput {
            latitude: 95.,
            longitude: 0.,
            timezone: 0.,
            elevation: 0.,
            air_temperatures: vec![0.; 8760],
            relative_humidities: vec![50.; 8760],
            wind_speeds: vec![1.; 8760],
            direct_normal_radiation: vec![0.; 8760],
            diffuse_horizontal_radiation: vec![0.; 8760],
            horizontal_infrared_radiation: vec![300.; 8760],
        };
        let result: Result<ExternalConditions, _> = input.try_into();
        assert!(result.is_err());
    }
}

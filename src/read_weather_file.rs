use crate::external_conditions::ExternalConditions;
use anyhow::{anyhow, Context};
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

// header row
const COLUMN_LATITUDE: usize = 6;
const COLUMN_LONGITUDE: usize = 7;
const COLUMN_TIMEZONE: usize = 8;
const COLUMN_ELEVATION: usize = 9;

// data rows
const COLUMN_AIR_TEMP: usize = 6; // dry bulb temp in degrees
const COLUMN_RELATIVE_HUMIDITY: usize = 8; // relative humidity in %
const COLUMN_HORIZONTAL_INFRARED: usize = 12; // horizontal infrared radiation intensity in W/m2
const COLUMN_DNI_RAD: usize = 14; // direct beam normal irradiation in Wh/m2
const COLUMN_DIF_RAD: usize = 15; // diffuse irradiation (horizontal plane) in Wh/m2
const COLUMN_WIND_SPEED: usize = 21; // wind speed in m/sec

/// Weather series read from an EPW file, before length/bounds validation.
#[derive(Clone, Debug)]
pub struct WeatherData {
    pub air_temperatures: Vec<f64>,
    pub relative_humidities: Vec<f64>,
    pub wind_speeds: Vec<f64>,
    pub direct_normal_radiation: Vec<f64>,
    pub diffuse_horizontal_radiation: Vec<f64>,
    pub horizontal_infrared_radiation: Vec<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: f64,
    pub elevation: f64,
}

impl WeatherData {
    pub fn into_external_conditions(self) -> anyhow::Result<ExternalConditions> {
        ExternalConditions::new(
            self.air_temperatures,
            self.relative_humidities,
            self.wind_speeds,
            self.direct_normal_radiation,
            self.diffuse_horizontal_radiation,
            self.horizontal_infrared_radiation,
            self.latitude,
            self.longitude,
            self.timezone,
            self.elevation,
        )
    }
}

/// Read the columns this engine needs out of an EPW weather file. The first
/// row carries the location; hourly data starts at row 8, after the other
/// header rows.
pub fn weather_data_to_vec(file: impl Read) -> anyhow::Result<WeatherData> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut air_temperatures = vec![];
    let mut relative_humidities = vec![];
    let mut wind_speeds = vec![];
    let mut direct_normal_radiation = vec![];
    let mut diffuse_horizontal_radiation = vec![];
    let mut horizontal_infrared_radiation = vec![];
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut timezone: Option<f64> = None;
    let mut elevation: Option<f64> = None;

    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading weather file row {i}"))?;
        if i == 0 {
            latitude = Some(parse_field(&record, COLUMN_LATITUDE, i)?);
            longitude = Some(parse_field(&record, COLUMN_LONGITUDE, i)?);
            timezone = Some(parse_field(&record, COLUMN_TIMEZONE, i)?);
            elevation = Some(parse_field(&record, COLUMN_ELEVATION, i)?);
        } else if i >= 8 {
            air_temperatures.push(parse_field(&record, COLUMN_AIR_TEMP, i)?);
            relative_humidities.push(parse_field(&record, COLUMN_RELATIVE_HUMIDITY, i)?);
            wind_speeds.push(parse_field(&record, COLUMN_WIND_SPEED, i)?);
            direct_normal_radiation.push(parse_field(&record, COLUMN_DNI_RAD, i)?);
            diffuse_horizontal_radiation.push(parse_field(&record, COLUMN_DIF_RAD, i)?);
            horizontal_infrared_radiation.push(parse_field(&record, COLUMN_HORIZONTAL_INFRARED, i)?);
        }
    }

    Ok(WeatherData {
        air_temperatures,
        relative_humidities,
        wind_speeds,
        direct_normal_radiation,
        diffuse_horizontal_radiation,
        horizontal_infrared_radiation,
        latitude: latitude.ok_or_else(|| anyhow!("weather file had no location row"))?,
        longitude: longitude.ok_or_else(|| anyhow!("weather file had no location row"))?,
        timezone: timezone.ok_or_else(|| anyhow!("weather file had no location row"))?,
        elevation: elevation.ok_or_else(|| anyhow!("weather file had no location row"))?,
    })
}

fn parse_field(record: &csv::StringRecord, column: usize, row: usize) -> anyhow::Result<f64> {
    record
        .get(column)
        .ok_or_else(|| anyhow!("weather file row {row} has no column {column}"))?
        .trim()
        .parse()
        .with_context(|| format!("parsing weather file row {row} column {column}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn data_row(temp: f64, rh: f64, infrared: f64, dni: f64, dhi: f64, wind: f64) -> String {
        let mut columns = vec!["0".to_string(); 22];
        columns[COLUMN_AIR_TEMP] = temp.to_string();
        columns[COLUMN_RELATIVE_HUMIDITY] = rh.to_string();
        columns[COLUMN_HORIZONTAL_INFRARED] = infrared.to_string();
        columns[COLUMN_DNI_RAD] = dni.to_string();
        columns[COLUMN_DIF_RAD] = dhi.to_string();
        columns[COLUMN_WIND_SPEED] = wind.to_string();
        columns.join(",")
    }

    #[fixture]
    fn weather_file() -> String {
        let mut content = String::from(
            "LOCATION,London Gatwick,-,GBR,TMYx,037760,51.15,-0.18,0.0,62.0\n",
        );
        for header in [
            "DESIGN CONDITIONS,0",
            "TYPICAL/EXTREME PERIODS,0",
            "GROUND TEMPERATURES,0",
            "HOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0",
            "COMMENTS 1,-",
            "COMMENTS 2,-",
            "DATA PERIODS,1,1,Data,Sunday, 1/ 1,12/31",
        ] {
            content.push_str(header);
            content.push('\n');
        }
        content.push_str(&data_row(10.5, 81., 339., 0., 0., 4.1));
        content.push('\n');
        content.push_str(&data_row(11.2, 76., 342., 420., 95., 3.6));
        content.push('\n');
        content
    }

    #[rstest]
    fn should_read_location_from_header_row(weather_file: String) {
        let data = weather_data_to_vec(weather_file.as_bytes()).unwrap();
        assert_relative_eq!(data.latitude, 51.15);
        assert_relative_eq!(data.longitude, -0.18);
        assert_relative_eq!(data.timezone, 0.);
        assert_relative_eq!(data.elevation, 62.);
    }

    #[rstest]
    fn should_read_hourly_series_from_data_rows(weather_file: String) {
        let data = weather_data_to_vec(weather_file.as_bytes()).unwrap();
        assert_eq!(data.air_temperatures, vec![10.5, 11.2]);
        assert_eq!(data.relative_humidities, vec![81., 76.]);
        assert_eq!(data.wind_speeds, vec![4.1, 3.6]);
        assert_eq!(data.direct_normal_radiation, vec![0., 420.]);
        assert_eq!(data.diffuse_horizontal_radiation, vec![0., 95.]);
        assert_eq!(data.horizontal_infrared_radiation, vec![339., 342.]);
    }

    #[rstest]
    fn should_reject_files_with_unparseable_values() {
        let content = "LOCATION,x,-,GBR,TMYx,0,not-a-number,0,0,0\n";
        assert!(weather_data_to_vec(content.as_bytes()).is_err());
    }

    #[rstest]
    fn should_reject_short_weather_years_on_conversion(weather_file: String) {
        // two data rows cannot form an 8760 hour year
        let data = weather_data_to_vec(weather_file.as_bytes()).unwrap();
        assert!(data.into_external_conditions().is_err());
    }
}

use crate::core::common::check_series_length;
use crate::simulation_time::{HOURS_IN_DAY, HOURS_IN_YEAR};
use thiserror::Error;

/// Latitude/longitude/timezone outside physical bounds. Fatal.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidLocationError {
    #[error("latitude {0} is outside the range -90 to 90 degrees")]
    Latitude(f64),
    #[error("longitude {0} is outside the range -180 to 180 degrees")]
    Longitude(f64),
    #[error("timezone {0} is outside the range -12 to 14 hours")]
    Timezone(f64),
}

/// A year of hourly weather for one location, with the solar position series
/// needed downstream precomputed for all 8760 hours in one pass.
#[derive(Clone, Debug)]
pub struct ExternalConditions {
    air_temps: Vec<f64>,
    relative_humidities: Vec<f64>,
    wind_speeds: Vec<f64>,
    direct_normal_radiations: Vec<f64>,
    diffuse_horizontal_radiations: Vec<f64>,
    horizontal_infrared_radiations: Vec<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: f64,
    pub elevation: f64,
    solar_altitudes: Vec<f64>,
    sun_up_flags: Vec<bool>,
}

/// Arguments:
/// * `air_temps` - list of external air temperatures, in deg C (one entry per hour)
/// * `relative_humidities` - list of relative humidities, in % (one entry per hour)
/// * `wind_speeds` - list of wind speeds, in m/s (one entry per hour)
/// * `direct_normal_radiations` - list of direct normal (beam) irradiance values, in W/m2 (one entry per hour)
/// * `diffuse_horizontal_radiations` - list of diffuse horizontal irradiance values, in W/m2 (one entry per hour)
/// * `horizontal_infrared_radiations` - list of horizontal infrared radiation intensity values, in W/m2 (one entry per hour)
/// * `latitude` - latitude of weather station, in degrees, -90 to 90 (single value)
/// * `longitude` - longitude of weather station, easterly +ve westerly -ve, in degrees (single value)
/// * `timezone` - timezone of weather station, in hours from UTC, -12 to 14 (single value)
/// * `elevation` - elevation of weather station above sea level, in m (single value)
impl ExternalConditions {
    pub fn new(
        air_temps: Vec<f64>,
        relative_humidities: Vec<f64>,
        wind_speeds: Vec<f64>,
        direct_normal_radiations: Vec<f64>,
        diffuse_horizontal_radiations: Vec<f64>,
        horizontal_infrared_radiations: Vec<f64>,
        latitude: f64,
        longitude: f64,
        timezone: f64,
        elevation: f64,
    ) -> anyhow::Result<Self> {
        validate_location(latitude, longitude, timezone)?;

        let hours_in_year = HOURS_IN_YEAR as usize;
        for (name, series) in [
            ("air temperature", &air_temps),
            ("relative humidity", &relative_humidities),
            ("wind speed", &wind_speeds),
            ("direct normal irradiance", &direct_normal_radiations),
            ("diffuse horizontal irradiance", &diffuse_horizontal_radiations),
            ("horizontal infrared radiation", &horizontal_infrared_radiations),
        ] {
            check_series_length(name, series, hours_in_year)?;
        }

        let days_in_year = hours_in_year / HOURS_IN_DAY as usize;
        let time_shift = init_time_shift(timezone, longitude);

        // # Calculate earth orbit deviation for each day of year
        let earth_orbit_deviations = (0..days_in_year)
            .map(init_earth_orbit_deviation)
            .collect::<Vec<f64>>();

        let solar_declinations = (0..days_in_year)
            .map(|day| init_solar_declination(earth_orbit_deviations[day]))
            .collect::<Vec<f64>>();

        let equations_of_time = (0..days_in_year)
            .map(init_equation_of_time)
            .collect::<Vec<f64>>();

        let solar_times = (0..hours_in_year)
            .map(|hour| {
                init_solar_time(
                    hour as u32 % HOURS_IN_DAY,
                    equations_of_time[hour / HOURS_IN_DAY as usize],
                    time_shift,
                )
            })
            .collect::<Vec<f64>>();

        let solar_hour_angles = (0..hours_in_year)
            .map(|hour| init_solar_hour_angle(solar_times[hour]))
            .collect::<Vec<f64>>();

        let solar_altitudes = (0..hours_in_year)
            .map(|hour| {
                init_solar_altitude(
                    latitude,
                    solar_declinations[hour / HOURS_IN_DAY as usize],
                    solar_hour_angles[hour],
                )
            })
            .collect::<Vec<f64>>();

        let sun_up_flags = solar_altitudes
            .iter()
            .map(|altitude| *altitude > 0.)
            .collect::<Vec<bool>>();

        Ok(Self {
            air_temps,
            relative_humidities,
            wind_speeds,
            direct_normal_radiations,
            diffuse_horizontal_radiations,
            horizontal_infrared_radiations,
            latitude,
            longitude,
            timezone,
            elevation,
            solar_altitudes,
            sun_up_flags,
        })
    }

    pub fn air_temps(&self) -> &[f64] {
        &self.air_temps
    }

    pub fn relative_humidities(&self) -> &[f64] {
        &self.relative_humidities
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }

    pub fn direct_normal_radiations(&self) -> &[f64] {
        &self.direct_normal_radiations
    }

    pub fn diffuse_horizontal_radiations(&self) -> &[f64] {
        &self.diffuse_horizontal_radiations
    }

    pub fn horizontal_infrared_radiations(&self) -> &[f64] {
        &self.horizontal_infrared_radiations
    }

    /// Solar altitude angle for each hour of the year, in degrees. Hours with
    /// the sun below the horizon report zero.
    pub fn solar_altitudes(&self) -> &[f64] {
        &self.solar_altitudes
    }

    /// Whether the sun is above the horizon at the given hour of the year.
    pub fn sun_up(&self, hour_of_year: usize) -> bool {
        self.sun_up_flags[hour_of_year]
    }

    pub fn sun_up_flags(&self) -> &[bool] {
        &self.sun_up_flags
    }
}

fn validate_location(
    latitude: f64,
    longitude: f64,
    timezone: f64,
) -> Result<(), InvalidLocationError> {
    if !(-90. ..=90.).contains(&latitude) {
        return Err(InvalidLocationError::Latitude(latitude));
    }
    if !(-180. ..=180.).contains(&longitude) {
        return Err(InvalidLocationError::Longitude(longitude));
    }
    if !(-12. ..=14.).contains(&timezone) {
        return Err(InvalidLocationError::Timezone(timezone));
    }

    Ok(())
}

fn init_earth_orbit_deviation(current_day: usize) -> f64 {
    let current_day = current_day + 1; //use 1-indexed day for this

    (360.0 / 365.0) * current_day as f64
}

fn init_solar_declination(earth_orbit_deviation: f64) -> f64 {
    //earth_orbit_deviation passed as degrees; shadow internally though as radians for trig functions
    let earth_orbit_deviation = earth_orbit_deviation.to_radians();

    0.33281
        - 22.984 * earth_orbit_deviation.cos()
        - 0.3499 * (2.0 * earth_orbit_deviation).cos()
        - 0.1398 * (3.0 * earth_orbit_deviation).cos()
        + 3.7872 * earth_orbit_deviation.sin()
        + 0.03205 * (2.0 * earth_orbit_deviation).sin()
        + 0.07187 * (3.0 * earth_orbit_deviation).sin()
}

fn init_equation_of_time(current_day: usize) -> f64 {
    // """ Calculate the equation of time """
    //
    // """
    // teq is the equation of time, in minutes;
    // nday is the day of the year, from 1 to 365
    // """
    let current_day = (current_day + 1) as i32; //use current_day as 1-indexed day of the year

    match current_day {
        nday if nday < 21 => 2.6 + 0.44 * nday as f64,
        nday if nday < 136 => 5.2 + 9.0 * ((nday - 43) as f64 * 0.0357).cos(),
        nday if nday < 241 => 1.4 - 5.0 * ((nday - 135) as f64 * 0.0449).cos(),
        nday if nday < 336 => -6.3 - 10.0 * ((nday - 306) as f64 * 0.036).cos(),
        nday => 0.45 * (nday - 359) as f64,
    }
}

fn init_time_shift(timezone: f64, longitude: f64) -> f64 {
    // """ Calculate the time shift, in hours, resulting from the fact that the
    // longitude and the path of the sun are not equal
    //
    // NOTE Daylight saving time is disregarded in tshift which is time independent
    // """
    timezone - longitude / 15.0
}

fn init_solar_time(hour_of_day: u32, equation_of_time: f64, time_shift: f64) -> f64 {
    // """ Calculate the solar time, tsol, as a function of the equation of time,
    // the time shift and the hour of the day """

    // #note we +1 here because the hour of day starts at 0
    // #while the sun path standard hour of day starts at 1 (hour 0 to 1)
    let hour_of_day = hour_of_day + 1;

    hour_of_day as f64 - (equation_of_time / 60.0) - time_shift
}

fn init_solar_hour_angle(solar_time: f64) -> f64 {
    // """ Calculate the solar hour angle, in the middle of the
    // current hour as a function of the solar time
    //
    // w is the solar hour angle, in degrees
    //
    // The hour numbers are actually hour sections: the first hour section of a
    // day runs from 0h to 1h, so the average position of the sun for the solar
    // radiation measured during hour section N is at solar time (N - 0.5)h.
    // """
    let mut solar_angle = (180 / 12) as f64 * (12.5 - solar_time);

    if solar_angle > 180.0 {
        solar_angle -= 360.0;
    } else if solar_angle < -180.0 {
        solar_angle += 360.0;
    }

    solar_angle
}

fn init_solar_altitude(latitude: f64, solar_declination: f64, solar_hour_angle: f64) -> f64 {
    // """ the angle between the solar beam and the horizontal surface, determined
    // in the middle of the current hour as a function of the solar hour angle,
    // the solar declination and the latitude """

    //all three params provided as degrees, but we need to shadow each as radians for trig calcs
    let latitude = latitude.to_radians();
    let solar_declination = solar_declination.to_radians();
    let solar_hour_angle = solar_hour_angle.to_radians();

    let asol = (solar_declination.sin() * latitude.sin()
        + solar_declination.cos() * latitude.cos() * solar_hour_angle.cos())
    .asin()
    .to_degrees();

    if asol < 0.0001 {
        return 0.;
    }

    asol
}

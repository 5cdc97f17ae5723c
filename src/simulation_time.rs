use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const HOURS_IN_DAY: u32 = 24;
pub const HOURS_IN_YEAR: u32 = 8760;

/// Reference year used to synthesise timestamps for the hourly series. Any
/// non-leap year works; weather years carry no year of their own.
pub const REFERENCE_YEAR: i32 = 2025;

// # Define hours that start each month (and end next month). Note there are 13
// # values so that end of final month is handled correctly.
// # E.g. Jan is hours 0-743
const MONTH_START_END_HOURS: [u32; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// An hour of the reference year, 0 to 8759.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourOfYear {
    pub index: usize,
}

impl HourOfYear {
    pub fn current_hour(&self) -> u32 {
        self.index as u32
    }

    /// Calendar month for this hour, 1 to 12.
    pub fn current_month(&self) -> u32 {
        let current_hour = self.current_hour();
        for (i, end_hour) in MONTH_START_END_HOURS.iter().enumerate().skip(1) {
            if current_hour < *end_hour {
                return i as u32;
            }
        }
        unreachable!("hour of year is below 8760")
    }

    /// Timestamp for this hour within the reference year.
    pub fn timestamp(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1)
            .expect("reference year start date is valid")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            + Duration::hours(self.index as i64)
    }
}

/// Iterator over all 8760 hours of the reference year, in order.
pub fn iter_hours_of_year() -> impl Iterator<Item = HourOfYear> {
    (0..HOURS_IN_YEAR as usize).map(|index| HourOfYear { index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_iterate_over_whole_year() {
        let hours: Vec<HourOfYear> = iter_hours_of_year().collect();
        assert_eq!(hours.len(), 8760);
        assert_eq!(hours[0].index, 0);
        assert_eq!(hours[8759].index, 8759);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(743, 1)]
    #[case(744, 2)]
    #[case(1416, 3)]
    #[case(4343, 6)]
    #[case(8015, 11)]
    #[case(8759, 12)]
    fn should_look_up_month_from_hour(#[case] hour: usize, #[case] expected_month: u32) {
        assert_eq!(HourOfYear { index: hour }.current_month(), expected_month);
    }

    #[rstest]
    fn should_synthesise_hourly_timestamps_for_reference_year() {
        let first = HourOfYear { index: 0 }.timestamp();
        let last = HourOfYear { index: 8759 }.timestamp();
        assert_eq!(first.to_string(), "2025-01-01 00:00:00");
        assert_eq!(last.to_string(), "2025-12-31 23:00:00");
    }

}

use crate::core::pet::ComfortCategory;
use crate::core::pipeline::{ExposureScenario, HourlyComfortRecord};
use indexmap::IndexMap;
use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Which hours of the year to include when aggregating.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, PartialEq)]
pub enum TimeFilter {
    Daytime,
    Nighttime,
    #[strum(serialize = "Entire Day")]
    EntireDay,
}

impl TimeFilter {
    fn matches(&self, record: &HourlyComfortRecord) -> bool {
        match self {
            Self::Daytime => record.sun_up,
            Self::Nighttime => !record.sun_up,
            Self::EntireDay => true,
        }
    }
}

/// Months in meteorological-year order, December first.
pub const METEOROLOGICAL_MONTH_ORDER: [u32; 12] = [12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One month's comfort-category distribution in percent. All nine categories
/// are always present; a month with no matching hours has all-zero
/// percentages rather than missing or NaN values.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyDistributionRow {
    /// calendar month, 1 to 12
    pub month: u32,
    pub month_abbreviation: &'static str,
    pub percentages: IndexMap<ComfortCategory, f64>,
}

/// Category percentages per month for one scenario and time filter, with
/// rows ordered December first through November.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyDistribution {
    pub rows: Vec<MonthlyDistributionRow>,
}

/// Distribution of comfort categories per calendar month for the chosen
/// scenario, over the hours passing the time filter.
pub fn monthly_comfort_percentages(
    records: &[HourlyComfortRecord],
    scenario: ExposureScenario,
    time_filter: TimeFilter,
) -> MonthlyDistribution {
    let counts = records
        .iter()
        .filter(|record| time_filter.matches(record))
        .map(|record| (record.month, record.category(scenario)))
        .counts();

    let rows = METEOROLOGICAL_MONTH_ORDER
        .iter()
        .map(|&month| {
            let month_total: usize = ComfortCategory::iter()
                .map(|category| counts.get(&(month, category)).copied().unwrap_or(0))
                .sum();
            let percentages = ComfortCategory::iter()
                .map(|category| {
                    let count = counts.get(&(month, category)).copied().unwrap_or(0);
                    let percentage = if month_total == 0 {
                        0.
                    } else {
                        count as f64 / month_total as f64 * 100.
                    };
                    (category, percentage)
                })
                .collect::<IndexMap<_, _>>();

            MonthlyDistributionRow {
                month,
                month_abbreviation: MONTH_ABBREVIATIONS[(month - 1) as usize],
                percentages,
            }
        })
        .collect();

    MonthlyDistribution { rows }
}

/// Distribution of comfort categories over the whole filtered period, for
/// the annual summary. Sums to 100, or to 0 when no hours match.
pub fn annual_comfort_percentages(
    records: &[HourlyComfortRecord],
    scenario: ExposureScenario,
    time_filter: TimeFilter,
) -> IndexMap<ComfortCategory, f64> {
    let counts = records
        .iter()
        .filter(|record| time_filter.matches(record))
        .map(|record| record.category(scenario))
        .counts();
    let total: usize = counts.values().sum();

    ComfortCategory::iter()
        .map(|category| {
            let count = counts.get(&category).copied().unwrap_or(0);
            let percentage = if total == 0 {
                0.
            } else {
                count as f64 / total as f64 * 100.
            };
            (category, percentage)
        })
        .collect()
}

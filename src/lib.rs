mod compare_floats;
pub mod core;
pub mod external_conditions;
pub mod input;
pub mod output;
pub mod read_weather_file;
mod simulation_time;

#[macro_use]
extern crate is_close;

pub use crate::core::aggregation::{
    annual_comfort_percentages, monthly_comfort_percentages, MonthlyDistribution, TimeFilter,
};
pub use crate::core::pet::ComfortCategory;
pub use crate::core::pipeline::{run_scenarios, ExposureScenario, HourlyComfortRecord};

use crate::external_conditions::ExternalConditions;
use crate::input::ingest_for_processing;
use crate::output::Output;
use csv::WriterBuilder;
use std::io::Read;
use strum::IntoEnumIterator;
use tracing::info;

/// Run a full assessment from an input document: compute the hourly comfort
/// records for the weather year, then write the year table and one monthly
/// distribution per scenario through the given output.
pub fn run_assessment(input: impl Read, output: impl Output) -> anyhow::Result<()> {
    let input = ingest_for_processing(input)?;
    let external_conditions: ExternalConditions = input.external_conditions.try_into()?;

    let records = run_scenarios(&external_conditions, &input.human_parameters)?;

    if output.is_noop() {
        return Ok(());
    }

    write_year_table_file(&output, &records)?;
    for scenario in ExposureScenario::iter() {
        let distribution = monthly_comfort_percentages(&records, scenario, TimeFilter::EntireDay);
        write_monthly_distribution_file(&output, scenario, &distribution)?;
    }

    Ok(())
}

/// Write the 8760-row year table: timestamp, sun flag, the four PET and
/// category columns, derived month and ideal strategy.
fn write_year_table_file(
    output: &impl Output,
    records: &[HourlyComfortRecord],
) -> anyhow::Result<()> {
    let output_key = "results";
    info!("writing year table to {output_key}");
    let writer = output.writer_for_location_key(output_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut headings = vec!["Date".to_string(), "Sun".to_string()];
    for scenario in ExposureScenario::iter() {
        headings.push(format!("{scenario} PET"));
    }
    for scenario in ExposureScenario::iter() {
        headings.push(format!("{scenario} Category"));
    }
    headings.push("Month".to_string());
    headings.push("Ideal Strategy".to_string());
    writer.write_record(&headings)?;

    for record in records {
        let mut row = vec![record.timestamp.to_string(), record.sun_up.to_string()];
        for scenario in ExposureScenario::iter() {
            row.push(record.pet(scenario).to_string());
        }
        for scenario in ExposureScenario::iter() {
            row.push(record.category(scenario).to_string());
        }
        row.push(record.month.to_string());
        row.push(record.ideal_strategy.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;

    Ok(())
}

/// Write one scenario's monthly distribution: a row per month, December
/// first, with a percentage column per comfort category.
fn write_monthly_distribution_file(
    output: &impl Output,
    scenario: ExposureScenario,
    distribution: &MonthlyDistribution,
) -> anyhow::Result<()> {
    let output_key = format!(
        "monthly_{}",
        scenario.to_string().to_lowercase().replace(' ', "_")
    );
    info!("writing monthly distribution to {output_key}");
    let writer = output.writer_for_location_key(&output_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut headings = vec!["Month".to_string()];
    headings.extend(ComfortCategory::iter().map(|category| category.to_string()));
    writer.write_record(&headings)?;

    for row in &distribution.rows {
        let mut record = vec![row.month_abbreviation.to_string()];
        record.extend(row.percentages.values().map(|percentage| percentage.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;

    Ok(())
}

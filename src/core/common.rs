// location for defining common types and errors used across submodules

use thiserror::Error;

/// Input series lengths disagree. Fatal to a run; no partial output is
/// produced once this is raised.
#[derive(Debug, Error, PartialEq)]
#[error("series '{series}' has {actual} entries where {expected} were expected")]
pub struct DimensionMismatchError {
    pub series: &'static str,
    pub expected: usize,
    pub actual: usize,
}

/// Check that a named series has the expected number of entries.
pub(crate) fn check_series_length(
    series: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), DimensionMismatchError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(DimensionMismatchError {
            series,
            expected,
            actual: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn should_accept_series_of_expected_length() {
        assert!(check_series_length("wind speed", &[0.; 4], 4).is_ok());
    }

    #[rstest]
    fn should_report_series_of_wrong_length() {
        let err = check_series_length("wind speed", &[0.; 3], 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "series 'wind speed' has 3 entries where 4 were expected"
        );
    }
}

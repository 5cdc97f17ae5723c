use anyhow::anyhow;
use roots::{find_root_brent, SimpleConvergency};

/// Find a root of `func` within [lower, upper] using Brent's method.
///
/// The bracket must straddle the root (opposite signs at the two ends).
pub(crate) fn root_in_bracket(
    func: impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    tol: f64,
) -> anyhow::Result<f64> {
    let mut convergency = SimpleConvergency {
        eps: tol,
        max_iter: 100,
    };

    find_root_brent(lower, upper, &func, &mut convergency).map_err(|e| anyhow!(e))
}

/// Find a root of `func` starting from a bracket that may not straddle it.
///
/// The bracket is widened geometrically about its midpoint until the function
/// changes sign across it, then Brent's method finishes the job. Used by the
/// body heat balance solves, whose equilibrium temperatures sit in a known
/// neighbourhood but can escape it under extreme weather.
pub(crate) fn root_with_expanding_bracket(
    func: impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    tol: f64,
) -> anyhow::Result<f64> {
    let (mut a, mut b) = (lower, upper);
    for _ in 0..60 {
        if func(a) * func(b) <= 0. {
            return root_in_bracket(&func, a, b, tol);
        }
        let half_width = (b - a) / 2.;
        let midpoint = (a + b) / 2.;
        a = midpoint - half_width * 1.6;
        b = midpoint + half_width * 1.6;
    }

    Err(anyhow!(
        "no sign change found in [{a}, {b}] after widening bracket"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_find_root_within_bracket() {
        let root = root_in_bracket(|x| x * x - 4., 0., 10., 1e-10).unwrap();
        assert_relative_eq!(root, 2., epsilon = 1e-8);
    }

    #[rstest]
    fn should_widen_bracket_until_root_is_straddled() {
        // root at x = 36.5 sits well outside the initial bracket
        let root = root_with_expanding_bracket(|x| x - 36.5, 0., 1., 1e-10).unwrap();
        assert_relative_eq!(root, 36.5, epsilon = 1e-8);
    }

    #[rstest]
    fn should_error_when_no_root_exists() {
        assert!(root_with_expanding_bracket(|x| x * x + 1., -1., 1., 1e-10).is_err());
    }
}

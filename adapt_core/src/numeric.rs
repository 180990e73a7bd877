//! Small numeric helpers shared by every model.
//!
//! All rounding goes through [`round_to`], which rounds half away from zero
//! on the decimal-scaled value. Keeping one policy in one place is what makes
//! the engine output bit-identical across calls.

/// Two-sided clamp. `lo` wins if the bounds are inverted.
pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    let capped = if value > hi { hi } else { value };
    if capped < lo {
        lo
    } else {
        capped
    }
}

/// Round to a fixed number of decimal places (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N)
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Successive differences `values[i+1] - values[i]`
pub fn diffs(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Ordinary least-squares slope of `values` against their 0-based index.
///
/// Returns 0.0 for fewer than two points, where the slope is undefined.
pub fn ols_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (values.len() - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    num / den
}

/// The last `n` elements of a slice (or all of it if shorter)
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_both_sides() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
        assert_eq!(clamp(50u32, 6, 45), 45);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(103.1, 2), 103.1);
    }

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(population_std(&values), 2.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_diffs() {
        assert_eq!(diffs(&[1.0, 3.0, 6.0]), vec![2.0, 3.0]);
        assert!(diffs(&[1.0]).is_empty());
    }

    #[test]
    fn test_ols_slope_on_a_line() {
        let values = [1.0, 3.0, 5.0, 7.0];
        assert!((ols_slope(&values) - 2.0).abs() < 1e-12);
        assert_eq!(ols_slope(&[4.0, 4.0, 4.0]), 0.0);
    }

    #[test]
    fn test_tail() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(tail(&values, 3), &[2.0, 3.0, 4.0]);
        assert_eq!(tail(&values, 10), &values);
    }
}

//! Correlation evaluation
//!
//! Computes Pearson's r and its two-tailed p-value over an aligned table.
//! Degenerate input (too few rows, a constant column, non-finite results)
//! yields no result instead of an error: a sweep over many pairs expects most
//! of them to lack variation.

use crate::align::AlignedTable;
use crate::round_to;
use crate::types::Correlation;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Fixed significance level for the `significant` flag
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default minimum sample count for single-pair and sweep flows
pub const DEFAULT_MIN_SAMPLES: usize = 7;

/// Default minimum sample count for lag profiles
pub const DEFAULT_LAG_MIN_SAMPLES: usize = 5;

/// Why a pair produced no correlation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Fewer rows than the minimum sample threshold
    InsufficientSamples { rows: usize, required: usize },
    /// A column has fewer than two distinct values
    ConstantColumn,
    /// A column's standard deviation is exactly zero
    ZeroDeviation,
    /// r or p came out NaN, infinite or out of range
    NonFinite,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientSamples { rows, required } => {
                write!(f, "insufficient samples ({rows} < {required})")
            }
            SkipReason::ConstantColumn => f.write_str("constant column"),
            SkipReason::ZeroDeviation => f.write_str("zero standard deviation"),
            SkipReason::NonFinite => f.write_str("non-finite result"),
        }
    }
}

/// Evaluate the correlation between the two columns of `aligned`.
///
/// Returns `None` whenever a guard trips; see [`try_evaluate`] for the reason.
pub fn evaluate_correlation(aligned: &AlignedTable, min_samples: usize) -> Option<Correlation> {
    try_evaluate(aligned, min_samples).ok()
}

/// Like [`evaluate_correlation`] but reports which guard tripped
pub fn try_evaluate(aligned: &AlignedTable, min_samples: usize) -> Result<Correlation, SkipReason> {
    let n = aligned.len();
    if n < min_samples {
        return Err(SkipReason::InsufficientSamples {
            rows: n,
            required: min_samples,
        });
    }

    let reference = aligned.reference_values();
    let secondary = aligned.secondary_values();

    if !has_variation(&reference) || !has_variation(&secondary) {
        return Err(SkipReason::ConstantColumn);
    }

    if std_dev(&reference) == 0.0 || std_dev(&secondary) == 0.0 {
        return Err(SkipReason::ZeroDeviation);
    }

    let r = pearson(&secondary, &reference);
    let p_value = p_value_for_r(r, n).ok_or(SkipReason::NonFinite)?;

    if !r.is_finite() || !p_value.is_finite() || !(-1.0..=1.0).contains(&r) {
        return Err(SkipReason::NonFinite);
    }

    Ok(Correlation {
        correlation: round_to(r, 3),
        p_value: round_to(p_value, 4),
        significant: p_value < SIGNIFICANCE_LEVEL,
        sample_size: n,
    })
}

/// At least two distinct values
fn has_variation(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().any(|v| v != first),
        None => false,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Pearson product-moment correlation over mean-centred columns.
///
/// Rounding overshoot past ±1 is clipped; a zero denominator gives NaN.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let mx = mean(x);
    let my = mean(y);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    (sxy / denominator).clamp(-1.0, 1.0)
}

/// Two-tailed p-value for r under H0: no linear association.
///
/// t = r·√(n−2) / √(1−r²), Student's t with n−2 degrees of freedom.
fn p_value_for_r(r: f64, n: usize) -> Option<f64> {
    if !r.is_finite() {
        return None;
    }
    // Two points always lie on a line
    if n < 3 {
        return Some(1.0);
    }

    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t_stat = r * (df / one_minus_r2).sqrt();

    let t_dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * t_dist.sf(t_stat.abs())).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignedRow;
    use chrono::{Duration, NaiveDate};

    fn table(pairs: &[(f64, f64)]) -> AlignedTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AlignedTable {
            rows: pairs
                .iter()
                .enumerate()
                .map(|(i, (reference, secondary))| AlignedRow {
                    date: start + Duration::days(i as i64),
                    reference: *reference,
                    secondary: *secondary,
                })
                .collect(),
        }
    }

    #[test]
    fn test_too_few_rows_gives_no_result() {
        let t = table(&[(1.0, 0.0), (2.0, 1.0), (3.0, 0.0), (4.0, 1.0)]);
        assert_eq!(
            try_evaluate(&t, 7),
            Err(SkipReason::InsufficientSamples {
                rows: 4,
                required: 7
            })
        );
        assert!(evaluate_correlation(&t, 7).is_none());
    }

    #[test]
    fn test_constant_reference_gives_no_result() {
        let pairs: Vec<(f64, f64)> = (0..14)
            .map(|i| (3.0, if i < 10 { 1.0 } else { 0.0 }))
            .collect();
        assert_eq!(try_evaluate(&table(&pairs), 7), Err(SkipReason::ConstantColumn));
    }

    #[test]
    fn test_constant_secondary_gives_no_result() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.0)).collect();
        assert!(evaluate_correlation(&table(&pairs), 7).is_none());
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let pairs: Vec<(f64, f64)> = (0..8)
            .map(|i| {
                let done = if i % 2 == 0 { 1.0 } else { 0.0 };
                (2.0 + 2.0 * done, done)
            })
            .collect();
        let result = evaluate_correlation(&table(&pairs), 7).unwrap();

        assert_eq!(result.correlation, 1.0);
        assert_eq!(result.p_value, 0.0);
        assert!(result.significant);
        assert_eq!(result.sample_size, 8);
    }

    #[test]
    fn test_known_values() {
        // r = 1.8 / sqrt(6.24) = 0.7206, n = 5 -> t = 1.8, df = 3, p ≈ 0.1695
        let t = table(&[(1.0, 0.0), (2.0, 0.0), (3.0, 1.0), (4.0, 1.0), (3.0, 0.0)]);
        let result = evaluate_correlation(&t, 5).unwrap();

        assert!((result.correlation - 0.721).abs() < 1e-9);
        assert!((result.p_value - 0.1695).abs() < 0.001);
        assert!(!result.significant);
    }

    #[test]
    fn test_swapping_columns_preserves_magnitude_and_p() {
        let t = table(&[
            (3.0, 1.0),
            (4.0, 1.0),
            (2.0, 0.0),
            (5.0, 1.0),
            (3.0, 0.0),
            (1.0, 0.0),
            (4.0, 0.5),
            (2.0, 1.0),
        ]);
        let forward = evaluate_correlation(&t, 7).unwrap();
        let backward = evaluate_correlation(&t.swapped(), 7).unwrap();

        assert_eq!(forward.correlation.abs(), backward.correlation.abs());
        assert_eq!(forward.p_value, backward.p_value);
    }

    #[test]
    fn test_negative_correlation_sign() {
        let pairs: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let done = if i % 3 == 0 { 1.0 } else { 0.0 };
                (5.0 - 3.0 * done + (i % 2) as f64 * 0.5, done)
            })
            .collect();
        let result = evaluate_correlation(&table(&pairs), 7).unwrap();
        assert!(result.correlation < 0.0);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_two_rows_p_value_is_one() {
        let t = table(&[(1.0, 0.0), (2.0, 1.0)]);
        let result = evaluate_correlation(&t, 2).unwrap();
        assert_eq!(result.correlation, 1.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.significant);
    }

    #[test]
    fn test_pearson_zero_denominator_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }
}

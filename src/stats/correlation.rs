//! Pearson correlation and its significance under a normal approximation.
//!
//! The p-value treats the t statistic as standard normal instead of using
//! Student's t with `n - 2` degrees of freedom. This overstates significance
//! for small samples and is kept on purpose so figures match the published
//! dashboard.

use statrs::function::erf::erf;

use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;
use crate::error::InsufficientDataError;

/// Threshold below which a correlation is reported as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Fewest paired observations for which the test is defined.
pub const MIN_OBSERVATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationTest {
    pub x: NumericColumn,
    pub y: NumericColumn,
    pub n: usize,
    pub r: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

/// Rows where both columns are present, as two aligned series.
pub fn paired_values(
    view: &FilteredView<'_>,
    x: NumericColumn,
    y: NumericColumn,
) -> (Vec<f64>, Vec<f64>) {
    view.iter()
        .filter_map(|rec| match (rec.value(x), rec.value(y)) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((a, b)),
            _ => None,
        })
        .unzip()
}

/// Correlate two columns of the view and estimate the two-sided p-value.
pub fn correlation(
    view: &FilteredView<'_>,
    x: NumericColumn,
    y: NumericColumn,
) -> Result<CorrelationTest, InsufficientDataError> {
    let (xs, ys) = paired_values(view, x, y);
    let n = xs.len();
    if n < MIN_OBSERVATIONS {
        return Err(InsufficientDataError::TooFewObservations { n });
    }
    for (column, values) in [(x, &xs), (y, &ys)] {
        if is_constant(values) {
            return Err(InsufficientDataError::ZeroVariance {
                column: column.name().to_string(),
            });
        }
    }

    let r = pearson_unchecked(&xs, &ys);
    let t_stat = r * ((n as f64 - 2.0) / (1.0 - r * r)).sqrt();
    let p_value = two_sided_p_value(t_stat);

    Ok(CorrelationTest {
        x,
        y,
        n,
        r,
        t_stat,
        p_value,
        is_significant: p_value < SIGNIFICANCE_LEVEL,
    })
}

/// `2 * (1 - Φ(|t|))` with Φ the standard normal CDF.
pub fn two_sided_p_value(t_stat: f64) -> f64 {
    let phi = 0.5 * (1.0 + erf(t_stat.abs() / std::f64::consts::SQRT_2));
    2.0 * (1.0 - phi)
}

/// Pearson's r, `None` for fewer than two pairs or a constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }
    Some(pearson_unchecked(xs, ys))
}

fn pearson_unchecked(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in xs.iter().zip(ys) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

// ---------------------------------------------------------------------------
// Correlation matrix (heatmap)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// `values[i][j]` is r between `columns[i]` and `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Pairwise r over `columns`, dropping incomplete rows per pair.
pub fn correlation_matrix(view: &FilteredView<'_>, columns: &[NumericColumn]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|&a| {
            columns
                .iter()
                .map(|&b| {
                    let (xs, ys) = paired_values(view, a, b);
                    if a == b {
                        pearson(&xs, &ys).map(|_| 1.0)
                    } else {
                        pearson(&xs, &ys)
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{Choice, FilterSelection, apply_filters};
    use crate::data::model::BattingTable;
    use crate::data::model::tests::rec;

    fn table_from(pairs: &[(i64, i64)]) -> BattingTable {
        BattingTable::from_records(
            pairs
                .iter()
                .enumerate()
                .map(|(i, &(runs, balls))| {
                    rec(2020, &format!("P{i}"), "X", runs, 100.0 + i as f64, 1, 0, balls)
                })
                .collect(),
        )
    }

    #[test]
    fn known_sample_matches_normal_approximation() {
        // balls = x, runs = y: r = 6 / sqrt(60), t = r * sqrt(3 / 0.4)
        let t = table_from(&[(2, 1), (4, 2), (5, 3), (4, 4), (5, 5)]);
        let test = correlation(
            &FilteredView::all(&t),
            NumericColumn::BallsFaced,
            NumericColumn::TotalRuns,
        )
        .unwrap();

        assert_eq!(test.n, 5);
        assert!((test.r - 6.0 / 60f64.sqrt()).abs() < 1e-12);
        assert!((test.t_stat - 4.5f64.sqrt()).abs() < 1e-9);
        // erfc(1.5)
        assert!((test.p_value - 0.033_894_853_524_689).abs() < 1e-9);
        assert!(test.is_significant);
    }

    #[test]
    fn perfect_correlation_has_zero_p_value() {
        let t = table_from(&[(10, 5), (20, 10), (30, 15), (40, 20)]);
        let test = correlation(
            &FilteredView::all(&t),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        )
        .unwrap();

        assert!((test.r - 1.0).abs() < 1e-12);
        assert!(test.p_value.abs() < 1e-12);
        assert!(test.is_significant);
    }

    #[test]
    fn uncorrelated_sample_is_not_significant() {
        let t = table_from(&[(1, 1), (2, 3), (3, 3), (4, 1)]);
        let test = correlation(
            &FilteredView::all(&t),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        )
        .unwrap();

        assert!(test.r.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-12);
        assert!(!test.is_significant);
    }

    #[test]
    fn results_stay_in_range() {
        let t = table_from(&[(5, 50), (7, 20), (1, 33), (9, 8), (4, 41), (6, 12), (3, 3)]);
        let test = correlation(
            &FilteredView::all(&t),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        )
        .unwrap();

        assert!((-1.0..=1.0).contains(&test.r));
        assert!((0.0..=1.0).contains(&test.p_value));
        assert_eq!(test.is_significant, test.p_value < SIGNIFICANCE_LEVEL);
    }

    #[test]
    fn empty_view_is_insufficient() {
        let t = table_from(&[(50, 40), (30, 30)]);
        let selection = FilterSelection {
            season: Choice::Only(1999),
            ..Default::default()
        };
        let err = correlation(
            &apply_filters(&t, &selection),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        )
        .unwrap_err();
        assert_eq!(err, InsufficientDataError::TooFewObservations { n: 0 });
    }

    #[test]
    fn missing_values_are_dropped_in_pairs() {
        let mut records: Vec<_> = table_from(&[(1, 2), (2, 4), (3, 7)]).records;
        let mut gap = rec(2020, "Q", "X", 0, 0.0, 0, 0, 99);
        gap.total_runs = None;
        records.push(gap);
        let t = BattingTable::from_records(records);

        let (xs, ys) = paired_values(
            &FilteredView::all(&t),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        );
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(ys, vec![2.0, 4.0, 7.0]);
    }

    #[test]
    fn constant_column_is_insufficient() {
        let t = table_from(&[(10, 5), (10, 6), (10, 7)]);
        let err = correlation(
            &FilteredView::all(&t),
            NumericColumn::TotalRuns,
            NumericColumn::BallsFaced,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InsufficientDataError::ZeroVariance {
                column: "total_runs".to_string()
            }
        );
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let t = table_from(&[(5, 50), (7, 20), (1, 33), (9, 8)]);
        let columns = [NumericColumn::TotalRuns, NumericColumn::BallsFaced, NumericColumn::Fours];
        let matrix = correlation_matrix(&FilteredView::all(&t), &columns);

        assert_eq!(matrix.values[0][0], Some(1.0));
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
        // fours is constant in this table
        assert_eq!(matrix.values[2][2], None);
        assert_eq!(matrix.values[0][2], None);
    }
}

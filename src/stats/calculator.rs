//! Statistics Calculator Module
//! Column-wise means and descriptive statistics over the numeric subset of a table.

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

/// The seven-number summary reported per numeric column.
///
/// `std` is the sample standard deviation (0.0 when fewer than two values);
/// quartiles use linear interpolation between order statistics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            q25: 0.0,
            q50: 0.0,
            q75: 0.0,
            max: 0.0,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Names of numeric columns, in table order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| crate::data::is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Non-null values of one column, cast to f64.
    pub fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Arithmetic mean per numeric column, in table order.
    ///
    /// Feeds the bar chart, so ordering matters: one entry per numeric column
    /// as they appear in the table.
    pub fn column_means(df: &DataFrame) -> Vec<(String, f64)> {
        Self::numeric_columns(df)
            .into_iter()
            .filter_map(|name| {
                let values = Self::column_values(df, &name);
                if values.is_empty() {
                    return None;
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Some((name, mean))
            })
            .collect()
    }

    /// Full descriptive statistics per numeric column, computed in parallel.
    pub fn describe(df: &DataFrame) -> Vec<(String, ColumnSummary)> {
        let names = Self::numeric_columns(df);
        names
            .par_iter()
            .map(|name| {
                let values = Self::column_values(df, name);
                (name.clone(), Self::summarize(&values))
            })
            .collect()
    }

    /// Compute the seven-number summary for an array of values.
    pub fn summarize(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        ColumnSummary {
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            q50: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn summary_of_known_values() {
        let summary = StatsCalculator::summarize(&[10.0, 20.0, 30.0]);
        assert_eq!(summary.count, 3);
        assert_close(summary.mean, 20.0);
        assert_close(summary.std, 10.0);
        assert_close(summary.min, 10.0);
        assert_close(summary.q25, 15.0);
        assert_close(summary.q50, 20.0);
        assert_close(summary.q75, 25.0);
        assert_close(summary.max, 30.0);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let summary = StatsCalculator::summarize(&[1.0, 2.0, 3.0, 4.0]);
        assert_close(summary.q25, 1.75);
        assert_close(summary.q50, 2.5);
        assert_close(summary.q75, 3.25);
    }

    #[test]
    fn single_value_has_zero_std() {
        let summary = StatsCalculator::summarize(&[42.0]);
        assert_eq!(summary.count, 1);
        assert_close(summary.std, 0.0);
        assert_close(summary.q50, 42.0);
    }

    #[test]
    fn empty_slice_gives_zeroed_summary() {
        assert_eq!(StatsCalculator::summarize(&[]), ColumnSummary::default());
    }

    #[test]
    fn non_numeric_columns_are_excluded() {
        let df = DataFrame::new(vec![
            Column::new("name".into(), vec!["A", "B"]),
            Column::new("score".into(), vec![1i64, 3]),
        ])
        .unwrap();

        assert_eq!(StatsCalculator::numeric_columns(&df), vec!["score"]);
        let means = StatsCalculator::column_means(&df);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].0, "score");
        assert_close(means[0].1, 2.0);
    }

    #[test]
    fn table_without_numeric_columns_yields_empty_outputs() {
        let df = DataFrame::new(vec![Column::new("name".into(), vec!["A", "B"])]).unwrap();
        assert!(StatsCalculator::column_means(&df).is_empty());
        assert!(StatsCalculator::describe(&df).is_empty());
    }

    #[test]
    fn nulls_are_excluded_from_statistics() {
        let df = DataFrame::new(vec![Column::new(
            "v".into(),
            vec![Some(1.0f64), None, Some(3.0)],
        )])
        .unwrap();

        let summary = &StatsCalculator::describe(&df)[0].1;
        assert_eq!(summary.count, 2);
        assert_close(summary.mean, 2.0);
    }

    #[test]
    fn describe_preserves_column_order() {
        let df = DataFrame::new(vec![
            Column::new("b".into(), vec![1i64, 2]),
            Column::new("a".into(), vec![3i64, 4]),
        ])
        .unwrap();

        let names: Vec<String> = StatsCalculator::describe(&df)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}

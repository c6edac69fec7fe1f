//! Row Filter Module
//! Narrows a table to rows where one column equals a request-supplied value.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Filter failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Optional (column, value) pair carried in the request form fields.
///
/// Both parts must be present and non-empty for the filter to apply; empty
/// strings count as absent, matching the upstream truthiness semantics.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub column: Option<String>,
    pub value: Option<String>,
}

impl FilterSpec {
    pub fn new(column: Option<String>, value: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            column: non_empty(column),
            value: non_empty(value),
        }
    }

    fn active(&self) -> Option<(&str, &str)> {
        match (&self.column, &self.value) {
            (Some(c), Some(v)) => Some((c.as_str(), v.as_str())),
            _ => None,
        }
    }
}

/// Apply a filter spec to a table, keeping only exactly-matching rows.
///
/// The filter value always arrives as text. When the target column is numeric
/// and the value parses as a number the comparison is done on Float64,
/// otherwise both sides are compared as strings. Null cells never match.
pub fn apply(df: &DataFrame, spec: &FilterSpec) -> Result<DataFrame, FilterError> {
    let Some((column, value)) = spec.active() else {
        return Ok(df.clone());
    };

    if !df.get_column_names().iter().any(|c| c.as_str() == column) {
        return Err(FilterError::ColumnNotFound(column.to_string()));
    }

    let numeric_target = crate::data::is_numeric_dtype(df.column(column)?.dtype());
    let predicate = match value.parse::<f64>() {
        Ok(parsed) if numeric_target => col(column).cast(DataType::Float64).eq(lit(parsed)),
        _ => col(column).cast(DataType::String).eq(lit(value.to_string())),
    };

    let filtered = df.clone().lazy().filter(predicate).collect()?;
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::new("name".into(), vec!["A", "B", "C"]),
            Column::new("score".into(), vec![10i64, 20, 30]),
        ])
        .unwrap()
    }

    #[test]
    fn missing_value_is_a_no_op() {
        let df = sample();
        let spec = FilterSpec::new(Some("name".to_string()), None);
        let out = apply(&df, &spec).unwrap();
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let df = sample();
        let spec = FilterSpec::new(Some("".to_string()), Some("B".to_string()));
        let out = apply(&df, &spec).unwrap();
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn string_match_keeps_only_equal_rows() {
        let df = sample();
        let spec = FilterSpec::new(Some("name".to_string()), Some("B".to_string()));
        let out = apply(&df, &spec).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.column("score").unwrap().get(0).unwrap(), AnyValue::Int64(20));
    }

    #[test]
    fn numeric_value_is_coerced_for_numeric_columns() {
        let df = sample();
        let spec = FilterSpec::new(Some("score".to_string()), Some("20".to_string()));
        let out = apply(&df, &spec).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn filtering_preserves_column_order() {
        let df = sample();
        let spec = FilterSpec::new(Some("name".to_string()), Some("A".to_string()));
        let out = apply(&df, &spec).unwrap();
        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
            vec!["name", "score"]
        );
    }

    #[test]
    fn filter_is_idempotent() {
        let df = sample();
        let spec = FilterSpec::new(Some("name".to_string()), Some("B".to_string()));
        let once = apply(&df, &spec).unwrap();
        let twice = apply(&once, &spec).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let df = sample();
        let spec = FilterSpec::new(Some("ghost".to_string()), Some("B".to_string()));
        let err = apply(&df, &spec).unwrap_err();
        assert!(matches!(err, FilterError::ColumnNotFound(c) if c == "ghost"));
    }
}

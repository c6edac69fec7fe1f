//! Data module - table loading and row filtering

pub mod filter;
mod loader;

pub use filter::FilterSpec;
pub use loader::{LoaderError, TableLoader};

use polars::prelude::DataType;

/// Dtypes the aggregation and filter stages treat as numeric.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

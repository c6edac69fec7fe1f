//! Table Loader Module
//! Turns uploaded bytes into a Polars DataFrame, dispatching on file extension.

use calamine::{Data, Range, Reader, Xls, Xlsx};
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Only Excel or CSV files allowed")]
    UnsupportedFormat,
    #[error("Failed to parse file: {0}")]
    Parse(String),
}

impl From<PolarsError> for LoaderError {
    fn from(err: PolarsError) -> Self {
        LoaderError::Parse(err.to_string())
    }
}

/// Loads CSV and Excel uploads into in-memory tables.
///
/// The first row is always treated as the header. Excel columns are typed by
/// scanning cells: all-integer columns become Int64, integer/float mixes
/// become Float64, everything else is kept as text.
pub struct TableLoader;

impl TableLoader {
    /// Parse uploaded bytes according to the filename's extension.
    pub fn from_bytes(bytes: &[u8], filename: &str) -> Result<DataFrame, LoaderError> {
        let ext = filename
            .rsplit('.')
            .next()
            .filter(|e| e.len() < filename.len())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Self::read_csv(bytes),
            "xlsx" => {
                let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
                    .map_err(|e| LoaderError::Parse(e.to_string()))?;
                let range = Self::first_worksheet(&mut workbook)?;
                Self::range_to_dataframe(&range)
            }
            "xls" => {
                let mut workbook = Xls::new(Cursor::new(bytes.to_vec()))
                    .map_err(|e| LoaderError::Parse(e.to_string()))?;
                let range = Self::first_worksheet(&mut workbook)?;
                Self::range_to_dataframe(&range)
            }
            _ => Err(LoaderError::UnsupportedFormat),
        }
    }

    fn read_csv(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }

    fn first_worksheet<R>(workbook: &mut R) -> Result<Range<Data>, LoaderError>
    where
        R: Reader<Cursor<Vec<u8>>>,
        R::Error: std::fmt::Display,
    {
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoaderError::Parse("workbook has no worksheets".to_string()))?;

        workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| LoaderError::Parse(e.to_string()))
    }

    /// Convert a calamine cell range (header row + data rows) into a DataFrame.
    fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, LoaderError> {
        let height = range.height();
        let width = range.width();
        if height == 0 || width == 0 {
            return Err(LoaderError::Parse("worksheet is empty".to_string()));
        }

        let headers: Vec<String> = (0..width)
            .map(|c| match range.get((0, c)) {
                Some(Data::Empty) | None => format!("column_{c}"),
                Some(cell) => Self::cell_to_string(cell),
            })
            .collect();

        let columns: Vec<Column> = (0..width)
            .map(|c| {
                let cells: Vec<&Data> = (1..height)
                    .map(|r| range.get((r, c)).unwrap_or(&Data::Empty))
                    .collect();
                Self::build_column(&headers[c], &cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    fn build_column(name: &str, cells: &[&Data]) -> Column {
        let mut all_int = true;
        let mut all_numeric = true;
        let mut seen_value = false;
        for cell in cells {
            match cell {
                Data::Empty => {}
                Data::Int(_) => seen_value = true,
                Data::Float(v) => {
                    seen_value = true;
                    if v.fract() != 0.0 {
                        all_int = false;
                    }
                }
                _ => {
                    seen_value = true;
                    all_int = false;
                    all_numeric = false;
                }
            }
        }

        if all_int && seen_value {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    _ => None,
                })
                .collect();
            return Column::new(name.into(), values);
        }

        if all_numeric && seen_value {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            return Column::new(name.into(), values);
        }

        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| match cell {
                Data::Empty => None,
                other => Some(Self::cell_to_string(other)),
            })
            .collect();
        Column::new(name.into(), values)
    }

    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.clone(),
            Data::Int(v) => v.to_string(),
            Data::Float(v) => v.to_string(),
            Data::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }
}

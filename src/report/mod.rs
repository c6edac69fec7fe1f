//! Report module - xlsx workbook generation

mod workbook;

pub use workbook::{ReportError, WorkbookBuilder, CHART_SHEET, DATA_SHEET};

//! Tablewise - Tabular Data Analysis & Excel Report Service
//!
//! Accepts a CSV or Excel upload over HTTP, optionally filters rows by an
//! exact column/value match, computes descriptive statistics and a bar chart
//! of per-column averages, and returns a two-sheet xlsx report plus the chart
//! PNG, base64-encoded, in a JSON payload.

pub mod api;
pub mod charts;
pub mod data;
pub mod error;
pub mod report;
pub mod stats;

//! Turn spreadsheet measurement logs into multi-axis time-series charts.
//!
//! Each input workbook carries a date column, a time column and any number
//! of numeric channels. One chart is rendered per workbook: a shared time
//! X-axis and one Y-axis per channel, the first on the left and the rest
//! stacked outward on the right.

pub mod config;
pub mod error;
pub mod load;
pub mod process;
pub mod render;
pub mod resolve;

pub use config::ChartConfig;
pub use error::FileError;

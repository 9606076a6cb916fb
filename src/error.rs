use thiserror::Error;

/// Everything that can go wrong while turning one workbook into one chart.
/// All variants are handled the same way at the batch boundary: log the
/// file and the reason, then continue with the next file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook contains no sheets")]
    NoSheet,

    #[error("sheet has {found} column(s), need at least 3 (date, time, data)")]
    InputShape { found: usize },

    #[error("row {row}: cannot combine date {date:?} and time {time:?} into a timestamp")]
    TimestampParse {
        row: usize,
        date: String,
        time: String,
    },

    #[error("no numeric data columns after the date and time columns")]
    NoNumericData,

    #[error("sheet has no data rows")]
    EmptySeries,

    #[error("chart rendering failed: {0}")]
    Render(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to open returns table '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read returns table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Returns table is missing required columns: {0}")]
    MissingColumns(String),

    #[error("Returns table is empty")]
    EmptyTable,

    #[error("Row {row}: invalid timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Row {row}: invalid number '{value}'")]
    InvalidNumber { row: usize, value: String },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Cannot compute metrics from an empty return series")]
    EmptySeries,

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),
}

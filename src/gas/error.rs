use crate::series::error::SeriesError;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationError {
    #[error("Reading at {end} is not later than the previous reading at {start}")]
    NonIncreasingReadings {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("A linear fit needs at least two intervals, got {found}")]
    TooFewIntervals { found: usize },

    #[error("All intervals share the same mean temperature, the slope is undefined")]
    DegenerateFit,

    #[error(transparent)]
    Series(#[from] SeriesError),
}

use crate::time_key::{KeyError, TimeKey};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("The series holds no samples, nothing to interpolate from")]
    EmptySeries,

    #[error("Interpolation needs at least two samples, the series holds {found}")]
    InsufficientSamples { found: usize },

    #[error("Invalid range: end key {end} must be greater than start key {start}")]
    InvalidRange { start: TimeKey, end: TimeKey },

    #[error("Key span from {start} to {end} does not fit in a time-key")]
    SpanOverflow { start: TimeKey, end: TimeKey },

    #[error("No calendar month {month} in year {year}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("No calendar day follows {0}")]
    DateOutOfRange(chrono::NaiveDate),

    #[error(transparent)]
    Key(#[from] KeyError),
}

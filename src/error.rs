use crate::dwd::error::IngestError;
use crate::gas::error::CorrelationError;
use crate::series::error::SeriesError;
use crate::time_key::KeyError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DwdError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}

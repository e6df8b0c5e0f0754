use crate::time_key::KeyError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Archive download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Failed to read zip archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("No archive member matches '{tag}'")]
    MemberNotFound { tag: String },

    #[error("Archive members {candidates:?} all match '{tag}', expected exactly one")]
    AmbiguousMember { tag: String, candidates: Vec<String> },

    #[error("Failed to read CSV data from '{member}'")]
    Csv {
        member: String,
        #[source]
        source: csv::Error,
    },

    #[error("Required column '{column}' not found in '{member}'")]
    MissingColumn { member: String, column: String },

    #[error("Row at line {line} has no value for column '{column}'")]
    MissingField { line: u64, column: String },

    #[error("Row at line {line} has a non-numeric temperature '{value}'")]
    BadTemperature { line: u64, value: String },

    #[error("Row at line {line} has an invalid timestamp")]
    BadTimestamp {
        line: u64,
        #[source]
        source: KeyError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

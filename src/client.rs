//! Entry point that ties ingestion and the temperature series together.

use crate::dwd::loader::ArchiveLoader;
use crate::dwd::source::{HourlySource, DEFAULT_BASE_URL};
use crate::error::DwdError;
use crate::series::temperature_series::TemperatureSeries;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::{bon, Builder};
use chrono_tz::Tz;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Zone assumed for naive instants unless configured otherwise.
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Berlin;

/// How long a downloaded archive is reused before it is fetched again.
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Settings of a [`DwdClient`].
///
/// ```
/// use dwd_temperature::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .cache_max_age(Duration::from_secs(6 * 60 * 60))
///     .default_zone(chrono_tz::UTC)
///     .build();
/// assert_eq!(config.default_zone, chrono_tz::UTC);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ClientConfig {
    /// Root of the DWD observation tree.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default = DEFAULT_CACHE_MAX_AGE)]
    pub cache_max_age: Duration,
    /// Zone used to interpret naive instants passed to the series.
    #[builder(default = DEFAULT_ZONE)]
    pub default_zone: Tz,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Fetches station data and builds owned [`TemperatureSeries`] from it.
///
/// Downloaded archives are cached on disk. Every call to
/// [`DwdClient::hourly_temperatures`] produces an independent series; callers
/// own it and pass it to whatever needs it.
///
/// # Examples
///
/// ```no_run
/// # use dwd_temperature::{DwdClient, DwdError};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), DwdError> {
/// let client = DwdClient::new().await?;
/// let mut series = client.hourly_temperatures("13777").call().await?;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
/// println!("{day}: {:.2} °C", series.mean_over_local_day(day)?);
/// # Ok(())
/// # }
/// ```
pub struct DwdClient {
    loader: ArchiveLoader,
    config: ClientConfig,
}

#[bon]
impl DwdClient {
    /// Creates a client caching into `cache_folder` with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`DwdError::CacheDirCreation`] if the folder cannot be created.
    pub async fn with_config(cache_folder: PathBuf, config: ClientConfig) -> Result<Self, DwdError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| DwdError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            loader: ArchiveLoader::new(&cache_folder, &config.base_url, config.cache_max_age),
            config,
        })
    }

    /// Creates a client with default settings caching into `cache_folder`.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, DwdError> {
        Self::with_config(cache_folder, ClientConfig::default()).await
    }

    /// Creates a client using the platform cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`DwdError::CacheDirResolution`] if the platform has no cache directory.
    pub async fn new() -> Result<Self, DwdError> {
        let cache_folder = get_cache_dir().map_err(DwdError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache_folder(&self) -> &Path {
        self.loader.cache_dir()
    }

    /// Ingests the recent hourly air temperatures of `station`.
    ///
    /// Optionally set `.default_zone(Tz)` to override the configured zone for
    /// naive instants. Finish with `.call().await`.
    ///
    /// # Errors
    ///
    /// Any failure while downloading, extracting or parsing the archive is
    /// returned as [`DwdError::Ingest`]; no partial series is produced.
    #[builder(start_fn = hourly_temperatures)]
    #[doc(hidden)]
    pub async fn build_hourly_temperatures(
        &self,
        #[builder(start_fn)] station: &str,
        default_zone: Option<Tz>,
    ) -> Result<TemperatureSeries, DwdError> {
        self.series_from_source(
            &HourlySource::station(station),
            default_zone.unwrap_or(self.config.default_zone),
        )
        .await
    }

    /// Ingests a custom source description into a series.
    pub async fn series_from_source(
        &self,
        source: &HourlySource,
        default_zone: Tz,
    ) -> Result<TemperatureSeries, DwdError> {
        let parsed = self.loader.load_samples(source).await?;
        let series = TemperatureSeries::from_samples(parsed.samples, default_zone);
        if series.is_empty() {
            warn!("No usable samples for {}", source);
        } else {
            info!(
                "Loaded {} samples for {} (keys {:?}..={:?})",
                series.len(),
                source,
                series.first_key(),
                series.last_key()
            );
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwd::extractor::tests::dwd_archive;
    use crate::dwd::error::IngestError;
    use crate::series::error::SeriesError;
    use crate::time_key::parse_and_key;
    use tempfile::tempdir;

    async fn offline_client(dir: &Path) -> Result<DwdClient, DwdError> {
        std::fs::write(
            dir.join(HourlySource::default().archive_file_name()),
            dwd_archive(),
        )
        .map_err(IngestError::from)?;
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .build();
        DwdClient::with_config(dir.to_path_buf(), config).await
    }

    #[tokio::test]
    async fn builds_a_series_from_the_cached_archive() -> Result<(), DwdError> {
        let dir = tempdir().map_err(IngestError::from)?;
        let client = offline_client(dir.path()).await?;
        let mut series = client.hourly_temperatures("13777").call().await?;

        assert_eq!(series.observed_len(), 3);
        assert_eq!(series.default_zone(), DEFAULT_ZONE);
        // 12:00 UTC was a sentinel row and is interpolated from 11:00 and 13:00.
        let noon = parse_and_key("2024010512", &chrono_tz::UTC)?;
        assert!((series.get_temperature(noon)? - 3.5).abs() < 1e-12);
        Ok(())
    }

    #[tokio::test]
    async fn default_zone_can_be_overridden_per_series() -> Result<(), DwdError> {
        let dir = tempdir().map_err(IngestError::from)?;
        let client = offline_client(dir.path()).await?;
        let mut series = client
            .hourly_temperatures("13777")
            .default_zone(chrono_tz::UTC)
            .call()
            .await?;
        assert_eq!(series.default_zone(), chrono_tz::UTC);
        assert!((series.temperature_at("2024-01-05 11:30:00")? - 3.25).abs() < 1e-12);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_station_without_network_fails_ingestion() -> Result<(), DwdError> {
        let dir = tempdir().map_err(IngestError::from)?;
        let client = offline_client(dir.path()).await?;
        let result = client.hourly_temperatures("99999").call().await;
        assert!(matches!(result, Err(DwdError::Ingest(_))));
        Ok(())
    }

    #[test]
    fn default_config_targets_dwd_and_berlin() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_zone, DEFAULT_ZONE);
        assert_eq!(config.cache_max_age, DEFAULT_CACHE_MAX_AGE);
    }

    #[test]
    fn series_errors_convert_into_crate_error() {
        let error: DwdError = SeriesError::EmptySeries.into();
        assert!(matches!(error, DwdError::Series(SeriesError::EmptySeries)));
    }
}

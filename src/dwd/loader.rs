use crate::dwd::error::IngestError;
use crate::dwd::extractor::{extract_member, parse_records, ParsedRecords};
use crate::dwd::source::HourlySource;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

/// Downloads station archives, keeps them in a cache folder and parses them.
pub struct ArchiveLoader {
    cache_dir: PathBuf,
    base_url: String,
    cache_max_age: Duration,
    download_client: Client,
}

impl ArchiveLoader {
    pub fn new(cache_dir: &Path, base_url: &str, cache_max_age: Duration) -> ArchiveLoader {
        ArchiveLoader {
            cache_dir: cache_dir.to_path_buf(),
            base_url: base_url.to_string(),
            cache_max_age,
            download_client: Client::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Loads, extracts and parses the product file of `source`.
    ///
    /// The extracted CSV is written next to the cached archive.
    pub async fn load_samples(&self, source: &HourlySource) -> Result<ParsedRecords, IngestError> {
        let archive = self.get_archive(source).await?;
        let source_owned = source.clone();
        let csv_path = self.cache_dir.join(source.csv_file_name());

        task::spawn_blocking(move || {
            let member = extract_member(&archive, &source_owned.member_tag)?;
            write_atomically(&csv_path, &member.contents)?;
            parse_records(&member, &source_owned)
        })
        .await?
    }

    /// Returns the raw archive bytes, from cache when fresh enough.
    pub async fn get_archive(&self, source: &HourlySource) -> Result<Vec<u8>, IngestError> {
        let archive_path = self.cache_dir.join(source.archive_file_name());

        if self.is_fresh(&archive_path).await? {
            info!("Cache hit for {} at {:?}", source, archive_path);
            return fs::read(&archive_path)
                .await
                .map_err(|e| IngestError::CacheRead(archive_path.clone(), e));
        }

        warn!("Cache miss for {}. Downloading.", source);
        let bytes = self.download(source).await?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| IngestError::CacheDirCreation(self.cache_dir.clone(), e))?;
        let cached = bytes.clone();
        let path = archive_path.clone();
        task::spawn_blocking(move || write_atomically(&path, &cached)).await??;
        info!("Cached archive for {} to {:?}", source, archive_path);
        Ok(bytes)
    }

    async fn is_fresh(&self, path: &Path) -> Result<bool, IngestError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(IngestError::CacheMetadataRead(path.to_path_buf(), e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| IngestError::CacheMetadataRead(path.to_path_buf(), e))?;
        // A modification time in the future counts as just written.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        Ok(age <= self.cache_max_age)
    }

    /// Performs one GET for the archive of `source`. No retries.
    async fn download(&self, source: &HourlySource) -> Result<Vec<u8>, IngestError> {
        let url = source.archive_url(&self.base_url);
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    IngestError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    IngestError::NetworkRequest(url, e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        info!("Downloaded {} bytes for {}", bytes.len(), source);
        Ok(bytes)
    }
}

/// Writes through a temp file in the target folder so readers never see a partial file.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), IngestError> {
    let write_error = |e: std::io::Error| IngestError::CacheWrite(path.to_path_buf(), e);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp_file.write_all(contents).map_err(write_error)?;
    temp_file.flush().map_err(write_error)?;
    temp_file
        .persist(path)
        .map_err(|e| IngestError::CacheWrite(path.to_path_buf(), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwd::extractor::tests::{archive_with, dwd_archive};
    use tempfile::tempdir;

    // Nothing listens here, so any network access fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn fresh_cached_archive_is_used_without_network() -> Result<(), IngestError> {
        let dir = tempdir()?;
        let source = HourlySource::default();
        std::fs::write(dir.path().join(source.archive_file_name()), dwd_archive())?;

        let loader = ArchiveLoader::new(dir.path(), UNREACHABLE, Duration::from_secs(3600));
        let parsed = loader.load_samples(&source).await?;

        assert_eq!(parsed.samples.len(), 3);
        let csv = std::fs::read_to_string(dir.path().join(source.csv_file_name()))?;
        assert!(csv.starts_with("STATIONS_ID;MESS_DATUM"));
        Ok(())
    }

    #[tokio::test]
    async fn stale_cache_triggers_a_download() -> Result<(), IngestError> {
        let dir = tempdir()?;
        let source = HourlySource::default();
        std::fs::write(dir.path().join(source.archive_file_name()), dwd_archive())?;

        let loader = ArchiveLoader::new(dir.path(), UNREACHABLE, Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = loader.get_archive(&source).await;
        assert!(matches!(result, Err(IngestError::NetworkRequest(..))));
        Ok(())
    }

    #[tokio::test]
    async fn archive_without_product_member_fails() -> Result<(), IngestError> {
        let dir = tempdir()?;
        let source = HourlySource::station("00662");
        std::fs::write(
            dir.path().join(source.archive_file_name()),
            archive_with(&[("Metadaten_Parameter.txt", "x")]),
        )?;

        let loader = ArchiveLoader::new(dir.path(), UNREACHABLE, Duration::from_secs(60));
        let result = loader.load_samples(&source).await;
        assert!(matches!(result, Err(IngestError::MemberNotFound { .. })));
        Ok(())
    }

    #[test]
    fn atomic_write_replaces_existing_file() -> Result<(), IngestError> {
        let dir = tempdir()?;
        let path = dir.path().join("file.bin");
        write_atomically(&path, b"first")?;
        write_atomically(&path, b"second")?;
        assert_eq!(std::fs::read(&path)?, b"second");
        Ok(())
    }
}

//! Locating the BlockCypher API Blueprint.
//!
//! Resolution order:
//! 1. the configured override path, if the file exists
//! 2. the temp-directory cache (`<tmp>/blockcypher-api-v1.md`)
//! 3. a download from the documentation host, written to whichever of the
//!    two locations is in effect
//!
//! Downloads land in a `.part` sibling first and are renamed into place only
//! once complete, so a reader never sees a truncated cache file.
//!
//! A cached file is used as-is; there is no freshness check.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{ApiError, CoreError};

/// File name of the published blueprint, also used for the cache entry.
pub const BLUEPRINT_FILE: &str = "blockcypher-api-v1.md";

/// Where the blueprint is published.
pub const DEFAULT_BLUEPRINT_URL: &str = "http://dev.blockcypher.com/blockcypher-api-v1.md";

/// Anything that can produce blueprint text.
#[async_trait]
pub trait BlueprintSource: Send + Sync {
    async fn load(&self) -> Result<String, CoreError>;
}

/// A blueprint already held in memory.
pub struct StaticBlueprint(pub String);

#[async_trait]
impl BlueprintSource for StaticBlueprint {
    async fn load(&self) -> Result<String, CoreError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct BlueprintConfig {
    /// Forces the blueprint location. Downloads land here when it is missing.
    pub override_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub remote_url: String,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            override_path: None,
            cache_dir: std::env::temp_dir(),
            remote_url: DEFAULT_BLUEPRINT_URL.to_owned(),
        }
    }
}

impl BlueprintConfig {
    /// The file the loader reads, or writes on a cache miss.
    pub fn location(&self) -> PathBuf {
        match &self.override_path {
            Some(path) => path.clone(),
            None => self.cache_dir.join(BLUEPRINT_FILE),
        }
    }
}

/// Filesystem-cached, network-backed [`BlueprintSource`].
pub struct BlueprintLoader {
    config: BlueprintConfig,
    client: reqwest::Client,
}

impl BlueprintLoader {
    pub fn new(config: BlueprintConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BlueprintConfig {
        &self.config
    }

    async fn download(&self, location: &Path) -> Result<String, CoreError> {
        info!(url = %self.config.remote_url, path = %location.display(), "downloading API blueprint");
        let partial = partial_path(location);
        match self.download_to(&partial, location).await {
            Ok(text) => {
                debug!(path = %location.display(), bytes = text.len(), "blueprint written");
                Ok(text)
            }
            Err(err) => {
                if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(
                            path = %partial.display(),
                            error = %remove_err,
                            "failed to remove partial blueprint download"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Stream the remote document into `partial`, then move it onto
    /// `location` once the body is complete and valid UTF-8.
    async fn download_to(&self, partial: &Path, location: &Path) -> Result<String, CoreError> {
        let mut response = self
            .client
            .get(&self.config.remote_url)
            .send()
            .await
            .map_err(|e| CoreError::BlueprintFetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::BlueprintFetch(format!(
                "GET {} returned {status}",
                self.config.remote_url
            )));
        }

        if let Some(parent) = partial.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(partial).await?;
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CoreError::BlueprintFetch(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            bytes.extend_from_slice(&chunk);
        }
        file.sync_all().await?;
        drop(file);

        let text = String::from_utf8(bytes)
            .map_err(|e| CoreError::BlueprintFetch(format!("blueprint is not UTF-8: {e}")))?;
        tokio::fs::rename(partial, location).await?;
        Ok(text)
    }
}

/// Sibling of `location` that receives an in-flight download. Unique per
/// download so concurrent loaders never share one.
fn partial_path(location: &Path) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let mut name = location.file_name().unwrap_or_default().to_os_string();
    name.push(format!(
        ".{}.{}.part",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    location.with_file_name(name)
}

#[async_trait]
impl BlueprintSource for BlueprintLoader {
    async fn load(&self) -> Result<String, CoreError> {
        let location = self.config.location();
        if tokio::fs::try_exists(&location).await? {
            debug!(path = %location.display(), "using cached API blueprint");
            return Ok(tokio::fs::read_to_string(&location).await?);
        }
        self.download(&location).await
    }
}

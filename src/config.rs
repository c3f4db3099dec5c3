//! Runtime configuration and backend wiring.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::{ApiVariant, CountriesApi, Endpoint, HttpTransport, Transport};
use crate::store::{CachedDirectory, DirectoryBackend, RemoteDirectory};
use crate::theme::FileStore;

/// How the store sources its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Derive one request per input change; the API searches.
    Remote,
    /// Load everything once, then search and filter in memory.
    Cached,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub api: ApiVariant,
    pub base_url: String,
    pub backend: BackendKind,
    pub timeout: Duration,
    pub storage_path: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::for_api(ApiVariant::RestCountries)
    }
}

impl DirectoryConfig {
    /// Defaults for an API variant: its public base URL and the backend it was built for.
    pub fn for_api(api: ApiVariant) -> Self {
        let backend = match api {
            ApiVariant::RestCountries => BackendKind::Remote,
            ApiVariant::LocalMock => BackendKind::Cached,
        };
        Self {
            api,
            base_url: api.default_base_url().to_string(),
            backend,
            timeout: Duration::from_secs(30),
            storage_path: default_storage_path(),
        }
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(&self.base_url, self.api).context("Invalid API base URL")
    }

    /// Build the configured backend over the given transport.
    pub fn backend_with(&self, transport: Arc<dyn Transport>) -> Result<Arc<dyn DirectoryBackend>> {
        let api = CountriesApi::new(transport, self.endpoint()?);
        info!(
            base_url = %self.base_url,
            api = ?self.api,
            backend = ?self.backend,
            "directory backend configured"
        );
        let backend: Arc<dyn DirectoryBackend> = match self.backend {
            BackendKind::Remote => Arc::new(RemoteDirectory::new(api)),
            BackendKind::Cached => Arc::new(CachedDirectory::new(api)),
        };
        Ok(backend)
    }

    /// Build the configured backend over a pooled HTTP client.
    pub fn backend(&self) -> Result<Arc<dyn DirectoryBackend>> {
        let transport = HttpTransport::new(self.timeout)?;
        self.backend_with(Arc::new(transport))
    }

    pub fn preference_store(&self) -> FileStore {
        FileStore::new(&self.storage_path)
    }
}

/// `<config dir>/countries/preferences.json`, or the working directory when
/// the platform has no config dir.
pub fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("countries")
        .join("preferences.json")
}

/// Expand `~` and `$VARS` in a user-supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).with_context(|| format!("Failed to expand path {raw}"))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

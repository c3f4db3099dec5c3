use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Core, DirectoryBackend, DirectorySnapshot, Pending};
use crate::api::CountriesApi;
use crate::models::{CountryOverview, CountryRecord};

/// Client-side cache backend.
///
/// [`DirectoryBackend::load`] fetches every country once; search and region
/// changes are then pure in-memory filtering. Code lookups go through the
/// resolver, which only touches the network on a cache miss.
#[derive(Clone)]
pub struct CachedDirectory {
    core: Core,
}

impl CachedDirectory {
    pub fn new(api: CountriesApi) -> Self {
        Self {
            core: Core::new(api, true),
        }
    }
}

#[async_trait]
impl DirectoryBackend for CachedDirectory {
    fn set_search_term(&self, term: &str) -> Pending {
        self.core.modify(|s| s.query.search_term = term.to_string());
        Pending::none()
    }

    fn set_region(&self, region: &str) {
        self.core.set_region(region);
    }

    /// Looks the code up with the casing the caller gave.
    fn set_country_code(&self, code: &str) -> Pending {
        let code = code.trim().to_string();
        let key = (!code.is_empty()).then(|| code.clone());
        let ticket = self.core.modify(|s| {
            s.query.country_code = code.to_lowercase();
            s.detail.request(key)
        });
        match ticket {
            Some(ticket) => self.core.resolve_detail(ticket, code),
            None => Pending::none(),
        }
    }

    fn load(&self) -> Pending {
        let descriptor = self.core.api.endpoint().catalog_urls().join(" ");
        let ticket = self.core.modify(|s| {
            s.overview
                .request(Some(descriptor.clone()))
                .or_else(|| s.overview.reissue())
        });
        let Some(ticket) = ticket else {
            return Pending::none();
        };

        let core = self.core.clone();
        Pending::from(tokio::spawn(async move {
            let result = core.api.fetch_catalog().await;
            let applied = core.cell.send_if_modified(|s| match result {
                Ok(records) => {
                    let overviews: Vec<CountryOverview> =
                        records.iter().map(CountryOverview::from).collect();
                    let count = records.len();
                    let applied = s.overview.settle(ticket, Ok(overviews));
                    if applied {
                        s.replace_catalog(records);
                        info!(count, "country catalog loaded");
                    }
                    applied
                }
                Err(e) => {
                    warn!(catalog = %descriptor, error = %e, "catalog load failed");
                    s.overview.settle(ticket, Err(e))
                }
            });
            if !applied {
                debug!(catalog = %descriptor, "discarded stale catalog response");
            }
        }))
    }

    fn snapshot(&self) -> DirectorySnapshot {
        self.core.snapshot()
    }

    fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.core.subscribe()
    }

    async fn border_countries(&self) -> Vec<CountryRecord> {
        self.core.border_countries().await
    }
}

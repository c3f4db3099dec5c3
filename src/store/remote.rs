use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use super::{Core, DirectoryBackend, DirectorySnapshot, Pending};
use crate::api::CountriesApi;
use crate::models::CountryRecord;

/// Derived-request backend: the API searches, the store only re-derives URLs.
///
/// An unchanged URL issues nothing; a changed one supersedes whatever fetch
/// was in flight for that query.
#[derive(Clone)]
pub struct RemoteDirectory {
    core: Core,
}

impl RemoteDirectory {
    pub fn new(api: CountriesApi) -> Self {
        Self {
            core: Core::new(api, false),
        }
    }
}

#[async_trait]
impl DirectoryBackend for RemoteDirectory {
    fn set_search_term(&self, term: &str) -> Pending {
        let url = self.core.api.endpoint().overview_url(term.trim());
        let ticket = self.core.modify(|s| {
            s.query.search_term = term.to_string();
            s.overview.request(Some(url.clone()))
        });
        match ticket {
            Some(ticket) => {
                debug!(url = %url, "overview request derived");
                self.core.fetch_overviews(ticket, url)
            }
            None => Pending::none(),
        }
    }

    fn set_region(&self, region: &str) {
        self.core.set_region(region);
    }

    fn set_country_code(&self, code: &str) -> Pending {
        let code = code.trim().to_lowercase();
        let url = (!code.is_empty()).then(|| self.core.api.endpoint().detail_url(&code));
        let ticket = self.core.modify(|s| {
            s.query.country_code = code.clone();
            s.detail.request(url.clone())
        });
        match (ticket, url) {
            (Some(ticket), Some(url)) => {
                debug!(url = %url, "detail request derived");
                self.core.fetch_detail(ticket, url)
            }
            _ => Pending::none(),
        }
    }

    fn load(&self) -> Pending {
        let endpoint = self.core.api.endpoint().clone();
        let (overview, detail) = self.core.modify(|s| {
            let url = endpoint.overview_url(s.query.search_term.trim());
            let overview = s
                .overview
                .request(Some(url.clone()))
                .or_else(|| s.overview.reissue())
                .map(|ticket| (ticket, url));
            let detail = s
                .detail
                .reissue()
                .zip(s.detail.key().map(str::to_string));
            (overview, detail)
        });

        let mut pending = Pending::none();
        if let Some((ticket, url)) = overview {
            pending = pending.and(self.core.fetch_overviews(ticket, url));
        }
        if let Some((ticket, url)) = detail {
            pending = pending.and(self.core.fetch_detail(ticket, url));
        }
        pending
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

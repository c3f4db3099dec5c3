//! Country directory store.
//!
//! One process-wide owner of the query state (search term, region, selected
//! code) and of the two per-query results (overview list, detail record).
//! State lives in a [`tokio::sync::watch`] cell: setters mutate it
//! synchronously, derived requests are issued as tasks, and their results are
//! written back only if their [`Ticket`](crate::resource::Ticket) is still
//! current.
//!
//! Two backends implement [`DirectoryBackend`]:
//! - [`RemoteDirectory`]: every input change re-derives a request URL and the
//!   API does the searching.
//! - [`CachedDirectory`]: [`DirectoryBackend::load`] pulls the full list once
//!   and searching/filtering is done in memory.

mod cached;
mod remote;
mod route;

pub use cached::CachedDirectory;
pub use remote::RemoteDirectory;
pub use route::follow_route;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::CountriesApi;
use crate::error::DirectoryError;
use crate::models::{CountryDetail, CountryOverview, CountryRecord};
use crate::resolver::CountryResolver;
use crate::resource::{FetchState, Resource, Ticket};
use crate::view;

/// User-facing inputs. Only the setters on a backend change these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    /// Empty means "all countries".
    pub search_term: String,
    /// Empty means "any region".
    pub region: String,
    /// Lower-cased; empty means "no detail pending".
    pub country_code: String,
}

/// Consistent view of the store at one instant.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub query: QueryState,
    /// Unfiltered list as fetched; see [`DirectorySnapshot::countries`].
    pub overview: Resource<Vec<CountryOverview>>,
    pub detail: Resource<CountryRecord>,
    catalog: Arc<Vec<CountryRecord>>,
    local_search: bool,
}

impl DirectorySnapshot {
    /// The list to display: searched (client-side backends only), region
    /// filtered and sorted by name.
    pub fn countries(&self) -> FetchState<Vec<CountryOverview>> {
        self.overview.state().map(|list| {
            if self.local_search {
                view::search_overviews(list, &self.query.search_term, &self.query.region)
            } else {
                view::overview_list(list, &self.query.region)
            }
        })
    }

    /// Distinct regions across the current overview list.
    pub fn regions(&self) -> BTreeSet<String> {
        self.overview
            .state()
            .value()
            .map(|list| view::unique_regions(list))
            .unwrap_or_default()
    }

    pub fn detail_view(&self) -> FetchState<CountryDetail> {
        self.detail.state().map(|record| CountryDetail::from(record))
    }

    /// Records known in memory, used to answer code lookups without the network.
    pub fn catalog(&self) -> &[CountryRecord] {
        &self.catalog
    }

    /// Insert or replace records by primary code. Returns whether anything changed.
    fn remember(&mut self, records: impl IntoIterator<Item = CountryRecord>) -> bool {
        let mut changed = false;
        for record in records {
            let catalog = Arc::make_mut(&mut self.catalog);
            match catalog.iter_mut().find(|c| c.code == record.code) {
                Some(existing) if *existing == record => {}
                Some(existing) => {
                    *existing = record;
                    changed = true;
                }
                None => {
                    catalog.push(record);
                    changed = true;
                }
            }
        }
        changed
    }

    fn replace_catalog(&mut self, records: Vec<CountryRecord>) {
        self.catalog = Arc::new(records);
    }
}

/// Fetch tasks started by a setter. Dropping this detaches them.
#[derive(Debug, Default)]
pub struct Pending(Vec<JoinHandle<()>>);

impl Pending {
    pub fn none() -> Self {
        Self::default()
    }

    /// True when the call issued no request.
    pub fn is_idle(&self) -> bool {
        self.0.is_empty()
    }

    pub fn and(mut self, other: Pending) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Wait for every issued fetch to write (or discard) its result.
    pub async fn settled(self) {
        for handle in self.0 {
            if let Err(e) = handle.await {
                warn!(error = %e, "fetch task did not complete");
            }
        }
    }
}

impl From<JoinHandle<()>> for Pending {
    fn from(handle: JoinHandle<()>) -> Self {
        Self(vec![handle])
    }
}

/// The store contract shared by both backends.
///
/// Setters never block; they return the fetches they started. Reads return
/// the latest settled state. Setters that issue requests must be called from
/// inside a Tokio runtime.
#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    fn set_search_term(&self, term: &str) -> Pending;

    fn set_region(&self, region: &str);

    fn set_country_code(&self, code: &str) -> Pending;

    /// Issue (or re-issue) the requests derived from the current state.
    /// This is also the only retry path after an error.
    fn load(&self) -> Pending;

    fn snapshot(&self) -> DirectorySnapshot;

    fn subscribe(&self) -> watch::Receiver<DirectorySnapshot>;

    /// Records for the selected country's borders, cache first.
    async fn border_countries(&self) -> Vec<CountryRecord>;
}

/// State cell plus the collaborators both backends need.
#[derive(Clone)]
struct Core {
    cell: Arc<watch::Sender<DirectorySnapshot>>,
    api: CountriesApi,
    resolver: CountryResolver,
}

impl Core {
    fn new(api: CountriesApi, local_search: bool) -> Self {
        let (cell, _) = watch::channel(DirectorySnapshot {
            local_search,
            ..DirectorySnapshot::default()
        });
        Self {
            cell: Arc::new(cell),
            resolver: CountryResolver::new(api.clone()),
            api,
        }
    }

    fn snapshot(&self) -> DirectorySnapshot {
        self.cell.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.cell.subscribe()
    }

    /// Mutate the snapshot, notify subscribers and hand back what the closure returned.
    fn modify<R: Default>(&self, f: impl FnOnce(&mut DirectorySnapshot) -> R) -> R {
        let mut out = R::default();
        self.cell.send_modify(|s| out = f(s));
        out
    }

    fn set_region(&self, region: &str) {
        self.modify(|s| s.query.region = region.to_string());
    }

    fn catalog(&self) -> Arc<Vec<CountryRecord>> {
        Arc::clone(&self.cell.borrow().catalog)
    }

    fn fetch_overviews(&self, ticket: Ticket, url: String) -> Pending {
        let core = self.clone();
        Pending::from(tokio::spawn(async move {
            let result = core.api.fetch_overviews(&url).await;
            if let Err(e) = &result {
                warn!(url = %url, error = %e, "overview fetch failed");
            }
            if !core.cell.send_if_modified(|s| s.overview.settle(ticket, result)) {
                debug!(url = %url, "discarded stale overview response");
            }
        }))
    }

    fn fetch_detail(&self, ticket: Ticket, url: String) -> Pending {
        let core = self.clone();
        Pending::from(tokio::spawn(async move {
            let result = core.api.fetch_detail(&url).await;
            core.settle_detail(ticket, result, &url);
        }))
    }

    fn resolve_detail(&self, ticket: Ticket, code: String) -> Pending {
        let core = self.clone();
        Pending::from(tokio::spawn(async move {
            let catalog = core.catalog();
            let result = core
                .resolver
                .resolve_one(&catalog, &code)
                .await
                .and_then(|hit| hit.ok_or_else(|| DirectoryError::not_found(code.as_str())));
            core.settle_detail(ticket, result, &code);
        }))
    }

    fn settle_detail(&self, ticket: Ticket, result: crate::error::Result<CountryRecord>, query: &str) {
        if let Err(e) = &result {
            warn!(query, error = %e, "detail fetch failed");
        }
        let applied = self.cell.send_if_modified(|s| {
            let record = result.as_ref().ok().cloned();
            let applied = s.detail.settle(ticket, result);
            if let (true, Some(record)) = (applied, record) {
                s.remember([record]);
            }
            applied
        });
        if !applied {
            debug!(query, "discarded stale detail response");
        }
    }

    async fn border_countries(&self) -> Vec<CountryRecord> {
        let (catalog, borders) = {
            let s = self.cell.borrow();
            let borders = s
                .detail
                .state()
                .value()
                .map(|record| record.borders.clone())
                .unwrap_or_default();
            (Arc::clone(&s.catalog), borders)
        };
        if borders.is_empty() {
            return Vec::new();
        }

        let records = self.resolver.resolve_many(&catalog, &borders).await;
        self.cell.send_if_modified(|s| s.remember(records.iter().cloned()));
        records
    }
}
